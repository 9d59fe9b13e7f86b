//! Outbound clients and in-process services

pub mod api_client;
pub mod github;
pub mod recommendations;
pub mod task_simulator;
pub mod uploads;
pub mod youtube;

pub use api_client::{ApiClient, ClientError, PingResult};
pub use github::{GitHubClient, Readme, ReadmeError};
pub use uploads::{StoredFile, UploadStore};
pub use youtube::{FetchOptions, YouTubeClient};
