//! LightX API client
//!
//! Drives the LightX image-editing API through one generic workflow: upload
//! images via pre-signed URLs, submit a feature job referencing them, and poll
//! the order until it completes, with a bounded fixed-interval retry budget.
//! Individual features (cleanup, expand, face swap, outfit, ...) are rows in
//! the feature table in [`models::feature`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::{ClientConfig, RetryPolicy};
pub use error::{ClientError, ClientResult};
pub use models::feature::{Feature, FeatureRequest};
pub use models::job::{Job, JobResult, JobStatus};
pub use models::upload::ContentType;
pub use services::batch::{run_batch, BatchItem};
pub use services::client::RemoteJobClient;
