//! storekit - load and save JSON dictionaries, serialized objects, tables and
//! images on local disk or in an S3 bucket.
//!
//! # Architecture
//!
//! - `storage`: the `ObjectBackend` trait (read, write, list) with local,
//!   S3 and in-memory implementations, and the `Storage` facade that routes
//!   a `Location` to the right backend
//! - `features`: format-specific operations layered on `Storage`
//! - `utils::numeric`: numeric-aware JSON encoding for `ndarray` values
//!
//! # Example
//!
//! ```no_run
//! use storekit::core::{Location, StorageConfig};
//! use storekit::features::{Dict, JsonOptions};
//! use storekit::Storage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     storekit::setup_logging();
//!
//!     let config = StorageConfig::from_env()?;
//!     let storage = Storage::from_config(&config).await;
//!
//!     let location = Location::parse("s3://my-bucket/runs/args.json")?;
//!     let args: Dict = storage.load_dict(&location).await?;
//!     storage
//!         .save_dict(&args, &Location::local("args.json"), &JsonOptions::default().indent(2))
//!         .await?;
//!
//!     if let Some(files) = storage.list_uris("processed_day=1", "my-bucket").await {
//!         println!("{files:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod features;
pub mod storage;
pub mod utils;

pub use crate::core::models::Location;
pub use errors::StorageError;
pub use storage::{ObjectBackend, Storage};

/// Configure structured logging with JSON format.
///
/// Installs a global tracing-subscriber with a JSON formatter. Call it once
/// at process start; later calls are ignored.
///
/// # Example
///
/// ```
/// storekit::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
