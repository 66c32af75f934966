//! Event types for the College Compass event system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// Position in the bus's publish order, starting at 1
    pub seq: u64,
    /// When the event occurred
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(seq: u64, event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq,
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All possible events in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "type")]
pub enum Event {
    // Search events
    /// A search was dispatched; results and comparison were cleared
    #[serde(rename = "search.started")]
    SearchStarted {
        request_id: u64,
        job: String,
        location: String,
    },

    /// Search results were published
    #[serde(rename = "search.completed")]
    SearchCompleted { request_id: u64, count: usize },

    /// Search failed; the user-facing message is in the store
    #[serde(rename = "search.failed")]
    SearchFailed { request_id: u64, message: String },

    /// A search response arrived after a newer search started and was dropped
    #[serde(rename = "search.superseded")]
    SearchSuperseded { request_id: u64 },

    // Comparison events
    /// A comparison was dispatched over the named colleges
    #[serde(rename = "compare.started")]
    CompareStarted {
        request_id: u64,
        colleges: Vec<String>,
    },

    /// Comparison analysis was published
    #[serde(rename = "compare.completed")]
    CompareCompleted { request_id: u64, entries: usize },

    /// Comparison failed
    #[serde(rename = "compare.failed")]
    CompareFailed { request_id: u64, message: String },

    /// A comparison response arrived after a newer comparison started
    #[serde(rename = "compare.superseded")]
    CompareSuperseded { request_id: u64 },

    // View state events
    /// A college was saved or unsaved
    #[serde(rename = "selection.changed")]
    SelectionChanged {
        name: String,
        saved: bool,
        count: usize,
    },

    /// The comparison panel was shown or hidden
    #[serde(rename = "comparison.visibility")]
    ComparisonVisibility { visible: bool },
}

impl Event {
    /// Dotted event name, as used for the `type` tag and SSE event names
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::SearchStarted { .. } => "search.started",
            Event::SearchCompleted { .. } => "search.completed",
            Event::SearchFailed { .. } => "search.failed",
            Event::SearchSuperseded { .. } => "search.superseded",
            Event::CompareStarted { .. } => "compare.started",
            Event::CompareCompleted { .. } => "compare.completed",
            Event::CompareFailed { .. } => "compare.failed",
            Event::CompareSuperseded { .. } => "compare.superseded",
            Event::SelectionChanged { .. } => "selection.changed",
            Event::ComparisonVisibility { .. } => "comparison.visibility",
        }
    }

    /// Request ticket this event belongs to, if any
    pub fn request_id(&self) -> Option<u64> {
        match self {
            Event::SearchStarted { request_id, .. }
            | Event::SearchCompleted { request_id, .. }
            | Event::SearchFailed { request_id, .. }
            | Event::SearchSuperseded { request_id }
            | Event::CompareStarted { request_id, .. }
            | Event::CompareCompleted { request_id, .. }
            | Event::CompareFailed { request_id, .. }
            | Event::CompareSuperseded { request_id } => Some(*request_id),
            Event::SelectionChanged { .. } | Event::ComparisonVisibility { .. } => None,
        }
    }

    /// True for events that end a request
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::SearchCompleted { .. }
                | Event::SearchFailed { .. }
                | Event::SearchSuperseded { .. }
                | Event::CompareCompleted { .. }
                | Event::CompareFailed { .. }
                | Event::CompareSuperseded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_envelope_creation() {
        let envelope = EventEnvelope::new(3, Event::ComparisonVisibility { visible: true });

        assert!(!envelope.id.is_nil());
        assert_eq!(envelope.seq, 3);
        assert!(envelope.timestamp <= Utc::now());
    }

    #[test]
    fn test_event_serialization_uses_dotted_tag() {
        let event = Event::SearchStarted {
            request_id: 1,
            job: "nurse".to_string(),
            location: "Boston".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "search.started");
        assert_eq!(json["type"], event.event_type());
        assert_eq!(json["job"], "nurse");
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"selection.changed","name":"Acme U","saved":true,"count":1}"#;
        let event: Event = serde_json::from_str(json).unwrap();

        assert_eq!(
            event,
            Event::SelectionChanged {
                name: "Acme U".to_string(),
                saved: true,
                count: 1,
            }
        );
    }

    #[test]
    fn test_request_id_and_terminal() {
        let started = Event::CompareStarted {
            request_id: 9,
            colleges: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(started.request_id(), Some(9));
        assert!(!started.is_terminal());

        let failed = Event::SearchFailed {
            request_id: 2,
            message: "boom".to_string(),
        };
        assert_eq!(failed.request_id(), Some(2));
        assert!(failed.is_terminal());

        let visibility = Event::ComparisonVisibility { visible: false };
        assert_eq!(visibility.request_id(), None);
        assert!(!visibility.is_terminal());
    }
}
