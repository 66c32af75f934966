use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use events::{EventBus, EventEnvelope};
use futures::stream::{Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 1000;
pub const SSE_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Most recent events, kept for `Last-Event-ID` replay
pub struct EventBuffer {
    events: VecDeque<EventEnvelope>,
    max_size: usize,
}

impl EventBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Append `envelope` unless an envelope with the same or a later
    /// sequence number is already buffered.
    pub fn push(&mut self, envelope: EventEnvelope) {
        if self.last_seq().is_some_and(|last| envelope.seq <= last) {
            return;
        }
        if self.events.len() >= self.max_size {
            self.events.pop_front();
        }
        self.events.push_back(envelope);
    }

    pub fn events_after(&self, seq: u64) -> Vec<EventEnvelope> {
        self.events
            .iter()
            .filter(|envelope| envelope.seq > seq)
            .cloned()
            .collect()
    }

    pub fn last_seq(&self) -> Option<u64> {
        self.events.back().map(|envelope| envelope.seq)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

pub type SharedEventBuffer = Arc<RwLock<EventBuffer>>;

/// Copy every event published on `bus` into `buffer` until the bus closes.
///
/// Must be called from within a tokio runtime.
pub fn spawn_event_recorder(bus: &EventBus, buffer: SharedEventBuffer) -> JoinHandle<()> {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => buffer
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(envelope),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event recorder lagged, {} events not buffered", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn envelope_to_sse_event(envelope: &EventEnvelope) -> Result<Event, Infallible> {
    let data = serde_json::to_string(envelope).unwrap_or_else(|_| "{}".to_string());

    Ok(Event::default()
        .id(envelope.seq.to_string())
        .event(envelope.event.event_type())
        .data(data))
}

fn last_event_id(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("Last-Event-ID")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(
        ("Last-Event-ID" = Option<u64>, Header, description = "Replay buffered events after this sequence number"),
    ),
    responses(
        (status = 200, description = "SSE stream of state change events"),
    ),
    tag = "events"
)]
pub async fn events_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading the buffer so nothing falls between the two
    let rx = state.event_bus.subscribe();

    let missed_events = match last_event_id(&headers) {
        Some(seq) => state
            .event_buffer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .events_after(seq),
        None => vec![],
    };
    let replayed_up_to = missed_events.last().map(|e| e.seq).unwrap_or(0);

    let missed_stream =
        futures::stream::iter(missed_events.into_iter().map(|e| envelope_to_sse_event(&e)));

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(envelope) if envelope.seq <= replayed_up_to => None,
            Ok(envelope) => Some(envelope_to_sse_event(&envelope)),
            Err(e) => {
                tracing::warn!("SSE broadcast error: {:?}", e);
                None
            }
        }
    });

    let stream = missed_stream.chain(live_stream);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(SSE_KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}
