//! General event stream

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use r2v_common::sse::create_event_bus_sse_stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /api/events
///
/// Streams every bus event (task changes, uploads, snippet submissions,
/// wizard steps) with its type as the SSE event name.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    create_event_bus_sse_stream(&state.event_bus)
}

pub fn sse_routes() -> Router<AppState> {
    Router::new().route("/api/events", get(event_stream))
}
