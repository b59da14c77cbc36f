// Security event logging.
//
// Notable pipeline outcomes (rate-limit trips, relay successes and failures)
// are recorded as structured `SecurityEvent`s and handed to an `EventSink`.
// Logging is fire-and-forget: the logger never returns an error, and a sink
// that can't write simply drops the record.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::clock::Clock;

/// Default user-agent string attached to events.
pub const DEFAULT_USER_AGENT: &str = concat!("contact-guard/", env!("CARGO_PKG_VERSION"));

/// The events the submission pipeline emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEventKind {
    RateLimitExceeded,
    EmailSent,
    EmailSendFailed,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            SecurityEventKind::EmailSent => "EMAIL_SENT",
            SecurityEventKind::EmailSendFailed => "EMAIL_SEND_FAILED",
        }
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic record. `details` are flattened into the top-level object
/// when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityEvent {
    pub event: String,
    /// RFC 3339 UTC timestamp, millisecond precision.
    pub timestamp: String,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl SecurityEvent {
    /// Look up a detail value as a string.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}

/// Destination for security events.
pub trait EventSink: Send + Sync {
    fn write(&self, event: &SecurityEvent);
}

/// Writes events to the `tracing` subscriber under the
/// `contact_guard::security` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn write(&self, event: &SecurityEvent) {
        let record = match serde_json::to_string(event) {
            Ok(json) => json,
            // Nothing sensible to fall back to; the event is lost.
            Err(_) => return,
        };

        match event.event.as_str() {
            "RATE_LIMIT_EXCEEDED" | "EMAIL_SEND_FAILED" => {
                warn!(target: "contact_guard::security", event = %event.event, %record, "Security event");
            }
            _ => {
                info!(target: "contact_guard::security", event = %event.event, %record, "Security event");
            }
        }
    }
}

/// Keeps every event in memory. Used by tests and by hosts that want to
/// inspect what the pipeline reported.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SecurityEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Events with the given tag.
    pub fn events_named(&self, event: &str) -> Vec<SecurityEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event == event)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn write(&self, event: &SecurityEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

/// Builds `SecurityEvent`s and forwards them to a sink.
pub struct SecurityLogger {
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    user_agent: String,
}

impl SecurityLogger {
    pub fn new(
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            clock,
            user_agent: user_agent.into(),
        }
    }

    /// Record `event` with the given details. Timestamp and user agent are
    /// filled in here; the details are copied into the record verbatim.
    pub fn log_security_event(&self, event: &str, details: Map<String, Value>) {
        let record = SecurityEvent {
            event: event.to_string(),
            timestamp: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            user_agent: self.user_agent.clone(),
            details,
        };
        self.sink.write(&record);
    }

    /// Convenience wrapper for the pipeline's own event kinds.
    pub fn log(&self, kind: SecurityEventKind, details: Map<String, Value>) {
        self.log_security_event(kind.as_str(), details);
    }
}

/// Build a details map from `(key, value)` pairs.
pub fn details<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_event_serializes_flat() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 4, 10, 30, 0).unwrap());
        let sink = Arc::new(MemorySink::new());
        let logger = SecurityLogger::new(sink.clone(), Arc::new(clock), "test-agent/1.0");

        logger.log(
            SecurityEventKind::RateLimitExceeded,
            details([("email", json!("x@y.com"))]),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        let value = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "RATE_LIMIT_EXCEEDED",
                "timestamp": "2026-05-04T10:30:00.000Z",
                "userAgent": "test-agent/1.0",
                "email": "x@y.com",
            })
        );
    }

    #[test]
    fn test_arbitrary_tags_and_empty_details() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 4, 10, 30, 0).unwrap());
        let sink = Arc::new(MemorySink::new());
        let logger = SecurityLogger::new(sink.clone(), Arc::new(clock), DEFAULT_USER_AGENT);

        logger.log_security_event("CUSTOM", Map::new());
        assert_eq!(sink.events_named("CUSTOM").len(), 1);
        assert!(sink.events()[0].details.is_empty());
        assert!(sink.events()[0].user_agent.starts_with("contact-guard/"));
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 4, 10, 30, 0).unwrap());
        let logger = SecurityLogger::new(Arc::new(TracingSink), Arc::new(clock), DEFAULT_USER_AGENT);
        logger.log(SecurityEventKind::EmailSent, details([("from", json!("a@b.co"))]));
        logger.log(SecurityEventKind::EmailSendFailed, Map::new());
    }
}
