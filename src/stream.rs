// src/stream.rs
//! Listener-side logic for a live tweet feed. Transport (connecting, reading the
//! socket, persisting payloads) belongs to the caller; this module only decides
//! what to do with each decoded event.
//!
//! Flow per event:
//! 1) snooze: ignore events until the interval since the last push has elapsed
//! 2) events without `text` are ignored
//! 3) keyword filter (all include keywords present, no exclude keyword)
//! 4) clean; blank `clean_text` is skipped
//! 5) build the payload, label it with the attached classifier (if any), reset snooze

use chrono::{DateTime, Duration, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::{anon_hash, FeatureAssembler, FeatureRecord};

pub const DEFAULT_SNOOZE_SECS: i64 = 3;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("stream_events_total", "Events seen by the stream listener.");
        describe_counter!("stream_pushed_total", "Payloads produced.");
        describe_counter!(
            "stream_skipped_total",
            "Events dropped (snooze, no text, keywords, blank clean text)."
        );
    });
}

/// Predicts a label from a feature record. The trained model lives outside this crate.
pub trait Classifier: Send + Sync {
    fn predict(&self, raw_text: &str, features: &FeatureRecord) -> i32;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hashtag {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
}

/// Subset of a streamed tweet object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetEvent {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp_ms: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Entities,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamPayload {
    pub id: Option<serde_json::Value>,
    pub timestamp: Option<String>,
    pub text: String,
    pub clean_text: String,
    pub clean_text_hash: String,
    pub hashtags: Vec<String>,
    pub predicted_label: Option<i32>,
    pub keywords: Vec<String>,
}

/// Lower-cased substring matching.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    include: Vec<String>,
    exclude: Vec<String>,
    strict: bool,
}

impl KeywordFilter {
    pub fn new<I, E>(include: I, exclude: E, strict: bool) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            include: include.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
            exclude: exclude.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
            strict,
        }
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn accepts(&self, text: &str) -> bool {
        if !self.strict {
            return true;
        }
        let text = text.to_lowercase();
        self.include.iter().all(|kw| text.contains(kw.as_str()))
            && !self.exclude.iter().any(|kw| text.contains(kw.as_str()))
    }
}

/// Minimum spacing between pushed payloads.
#[derive(Debug, Clone)]
pub struct Snooze {
    interval: Duration,
    last_push_at: DateTime<Utc>,
}

impl Snooze {
    /// The first event is only accepted once `interval` has passed since `started_at`.
    pub fn new(interval_secs: i64, started_at: DateTime<Utc>) -> Self {
        Self {
            interval: Duration::seconds(interval_secs),
            last_push_at: started_at,
        }
    }

    pub fn is_awake(&self, now: DateTime<Utc>) -> bool {
        now - self.last_push_at >= self.interval
    }

    pub fn record_push(&mut self, now: DateTime<Utc>) {
        self.last_push_at = now;
    }
}

/// Hex MD5, the dedup key rows already stored downstream were written with.
pub fn clean_text_hash(clean_text: &str) -> String {
    use md5::{Digest, Md5};
    let digest = Md5::digest(clean_text.as_bytes());
    let mut out = String::with_capacity(32);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub struct StreamListener<'a> {
    extractor: &'a FeatureAssembler,
    filter: KeywordFilter,
    snooze: Snooze,
    classifier: Option<Box<dyn Classifier + 'a>>,
}

impl<'a> StreamListener<'a> {
    pub fn new(extractor: &'a FeatureAssembler, filter: KeywordFilter, snooze: Snooze) -> Self {
        Self {
            extractor,
            filter,
            snooze,
            classifier: None,
        }
    }

    pub fn with_classifier<C: Classifier + 'a>(mut self, classifier: C) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Returns a payload when the event should be pushed downstream.
    pub fn on_event(&mut self, event: &TweetEvent, now: DateTime<Utc>) -> Option<StreamPayload> {
        ensure_metrics_described();
        counter!("stream_events_total").increment(1);
        let payload = self.evaluate(event, now);
        match &payload {
            Some(_) => {
                self.snooze.record_push(now);
                counter!("stream_pushed_total").increment(1);
            }
            None => counter!("stream_skipped_total").increment(1),
        }
        payload
    }

    fn evaluate(&self, event: &TweetEvent, now: DateTime<Utc>) -> Option<StreamPayload> {
        if !self.snooze.is_awake(now) {
            return None;
        }
        let text = event.text.as_deref()?;
        if !self.filter.accepts(text) {
            debug!(target: "stream", id = %anon_hash(text), "keyword filter rejected");
            return None;
        }
        // the full record is only needed when there is a classifier to feed
        let (clean_text, features) = match &self.classifier {
            Some(_) => {
                let features = self.extractor.extract(text);
                (features.clean_text.clone(), Some(features))
            }
            None => (self.extractor.clean_text(text), None),
        };
        if clean_text.trim().is_empty() {
            debug!(target: "stream", id = %anon_hash(text), "blank clean text");
            return None;
        }
        let predicted_label = self
            .classifier
            .as_ref()
            .zip(features.as_ref())
            .map(|(c, features)| c.predict(text, features));
        Some(StreamPayload {
            id: event.id.clone(),
            timestamp: event.timestamp_ms.clone(),
            text: text.to_string(),
            clean_text_hash: clean_text_hash(&clean_text),
            clean_text,
            hashtags: event
                .entities
                .hashtags
                .iter()
                .map(|h| h.text.clone())
                .collect(),
            predicted_label,
            keywords: self.filter.include().to_vec(),
        })
    }
}
