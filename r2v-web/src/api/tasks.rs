//! Mock indexing task endpoints
//!
//! Each SSE connection owns its own randomized task list and advances it on
//! a timer; nothing is shared between clients.

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use futures::stream::Stream;
use r2v_common::events::R2vEvent;
use r2v_common::model::IndexingTask;
use r2v_common::sse::{json_event, with_keep_alive};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::convert::Infallible;
use tracing::{debug, info};

use crate::services::task_simulator::{snapshot, TaskFeed};
use crate::AppState;

/// Payload of the task stream's `data:` lines
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TaskStreamMessage {
    /// Full list, sent once on connect
    Init { tasks: Vec<IndexingTask> },
    /// One task whose status changed
    Update { task: IndexingTask },
}

/// GET /api/tasks
pub async fn list_tasks() -> Json<Vec<IndexingTask>> {
    let mut rng = rand::thread_rng();
    Json(snapshot(&mut rng, Utc::now()))
}

/// GET /api/sse (alias /api/tasks/stream)
///
/// First event carries `{"type":"INIT","tasks":[...]}`; each tick then
/// sends one `{"type":"UPDATE","task":{...}}` per changed task. Changes
/// are also published on the event bus.
pub async fn task_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to task stream");

    let tick = state.task_tick();
    let bus = state.event_bus.clone();

    let stream = async_stream::stream! {
        let mut rng = StdRng::from_entropy();
        let mut feed = TaskFeed::new(snapshot(&mut rng, Utc::now()));

        if let Some(event) = json_event(&TaskStreamMessage::Init {
            tasks: feed.tasks().to_vec(),
        }) {
            yield Ok(event);
        }

        let mut interval = tokio::time::interval(tick);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            for (old_status, task) in feed.tick(&mut rng, Utc::now()) {
                debug!(
                    task_id = %task.id,
                    from = old_status.as_str(),
                    to = task.status.as_str(),
                    "Task advanced"
                );
                bus.emit_lossy(R2vEvent::TaskStatusChanged {
                    task: task.clone(),
                    old_status,
                    timestamp: Utc::now(),
                });

                if let Some(event) = json_event(&TaskStreamMessage::Update { task }) {
                    yield Ok(event);
                }
            }
        }
    };

    with_keep_alive(stream)
}

/// Build task routes
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks))
        .route("/api/sse", get(task_stream))
        .route("/api/tasks/stream", get(task_stream))
}
