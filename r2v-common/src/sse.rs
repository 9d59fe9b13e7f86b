//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE plumbing for the Reels2Vec service.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::events::EventBus;

/// Keep-alive interval applied to every stream
pub const KEEP_ALIVE_SECS: u64 = 15;

/// Wrap a stream with the standard keep-alive comment
pub fn with_keep_alive<S>(stream: S) -> Sse<S>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("heartbeat"),
    )
}

/// Serialize a payload into an unnamed `data:` event
///
/// Returns `None` (after logging) when serialization fails.
pub fn json_event<T: Serialize>(payload: &T) -> Option<Event> {
    match serde_json::to_string(payload) {
        Ok(json) => Some(Event::default().data(json)),
        Err(e) => {
            warn!("SSE: Failed to serialize payload: {}", e);
            None
        }
    }
}

/// Stream every bus event to one SSE client
///
/// Emits an initial `ConnectionStatus` event, then each event with its type
/// as the SSE event name. Lagged receivers skip the missed events.
pub fn create_event_bus_sse_stream(
    bus: &EventBus,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to general events");

    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let event_type = event.event_type().to_string();
                    match serde_json::to_string(&event) {
                        Ok(event_json) => {
                            debug!("SSE: Broadcasting event: {}", event_type);
                            yield Ok(Event::default().event(event_type).data(event_json));
                        }
                        Err(e) => {
                            warn!("SSE: Failed to serialize event {}: {}", event_type, e);
                        }
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("SSE: Client lagged, skipped {} events", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    info!("SSE: Event bus closed, ending stream");
                    break;
                }
            }
        }
    };

    with_keep_alive(stream)
}
