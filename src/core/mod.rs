//! Configuration and shared data types

pub mod config;
pub mod models;

pub use config::StorageConfig;
pub use models::{Location, S3_SCHEME};
