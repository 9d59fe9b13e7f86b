//! r2v-web library interface
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

pub mod api;
pub mod create;
pub mod error;
pub mod services;
pub mod snippet;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use r2v_common::config::TomlConfig;
use r2v_common::events::EventBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::create::SessionStore;
use crate::services::{ApiClient, ClientError, GitHubClient, UploadStore, YouTubeClient};
use crate::snippet::SubmissionLog;

/// Capacity of the in-process event channel
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<TomlConfig>,
    /// Video metadata client
    pub youtube: Arc<YouTubeClient>,
    /// README client
    pub github: Arc<GitHubClient>,
    /// First-party backend client (bearer-token aware)
    pub backend: Arc<ApiClient>,
    /// Upload directory
    pub uploads: UploadStore,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Create wizard sessions
    pub sessions: SessionStore,
    /// Recently submitted snippet windows
    pub submissions: Arc<RwLock<SubmissionLog>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: TomlConfig) -> Result<Self, ClientError> {
        let youtube = YouTubeClient::new(&config.youtube_api_base, config.youtube_api_key.clone())?;
        let github = GitHubClient::new(&config.github_api_base)?;
        let backend = ApiClient::new(&config.backend_base_url)?;
        let uploads = UploadStore::new(config.upload_dir());

        Ok(Self {
            config: Arc::new(config),
            youtube: Arc::new(youtube),
            github: Arc::new(github),
            backend: Arc::new(backend),
            uploads,
            event_bus: EventBus::new(EVENT_BUS_CAPACITY),
            sessions: SessionStore::new(),
            submissions: Arc::new(RwLock::new(SubmissionLog::default())),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }

    /// Replace the session store (tests shorten the recommendations delay)
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// Remember `message` as the most recent error for `/health`
    pub async fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "Recording last error");
        *self.last_error.write().await = Some(message);
    }

    /// Tick interval for the mock task stream
    pub fn task_tick(&self) -> Duration {
        Duration::from_millis(self.config.task_tick_ms.max(1))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::catalog_routes())
        .merge(api::settings_routes())
        .merge(api::task_routes())
        .merge(api::sse_routes())
        .merge(api::readme_routes())
        .merge(api::upload_routes(state.config.max_upload_bytes))
        .merge(api::snippet_routes())
        .merge(api::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
