//! HTTP API handlers for r2v-web

pub mod catalog;
pub mod create;
pub mod health;
pub mod readme;
pub mod settings;
pub mod snippet;
pub mod sse;
pub mod tasks;
pub mod upload;

pub use catalog::catalog_routes;
pub use create::create_routes;
pub use health::health_routes;
pub use readme::readme_routes;
pub use settings::settings_routes;
pub use snippet::snippet_routes;
pub use sse::sse_routes;
pub use tasks::task_routes;
pub use upload::upload_routes;
