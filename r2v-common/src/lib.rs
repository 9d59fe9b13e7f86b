//! # Reels2Vec Common Library
//!
//! Shared code for the Reels2Vec web service including:
//! - Track and task data model
//! - Event types (R2vEvent enum) and the broadcast bus
//! - Bootstrap configuration loading
//! - SSE helpers
//! - Time and region display helpers

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod model;
pub mod regions;
pub mod sse;

pub use error::{Error, Result};
pub use model::{IndexingTask, LibraryEntry, Settings, TaskStatus, Track};
