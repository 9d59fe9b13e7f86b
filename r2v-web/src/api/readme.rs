//! Project README endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::services::github::Readme;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/readme
///
/// **Response:** `{"repo_url": "...", "markdown": "...", "html": "..."}`
///
/// **Errors:**
/// - 502 Bad Gateway: repository not configured, malformed URL, or the
///   GitHub request failed
pub async fn get_readme(State(state): State<AppState>) -> ApiResult<Json<Readme>> {
    match state
        .github
        .fetch_readme(state.config.github_repo.as_deref())
        .await
    {
        Ok(readme) => Ok(Json(readme)),
        Err(e) => {
            state.record_error(e.to_string()).await;
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}

pub fn readme_routes() -> Router<AppState> {
    Router::new().route("/api/readme", get(get_readme))
}
