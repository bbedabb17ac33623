//! Error types for the deployment pipeline.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by object store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No credentials could be resolved for the storage account.
    #[error("failed to resolve storage credentials: {detail}")]
    Credentials {
        /// Provider error detail.
        detail: String,
    },
    /// Creating the staging bucket failed for a reason other than it already existing.
    #[error("failed to create bucket '{bucket}': {detail}")]
    BucketCreate {
        /// Bucket name.
        bucket: String,
        /// Provider error detail.
        detail: String,
    },
    /// Applying the lifecycle policy failed.
    #[error("failed to configure lifecycle for bucket '{bucket}': {detail}")]
    Lifecycle {
        /// Bucket name.
        bucket: String,
        /// Provider error detail.
        detail: String,
    },
    /// Writing the archive object failed.
    #[error("failed to upload '{key}' to bucket '{bucket}': {detail}")]
    Upload {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Provider error detail.
        detail: String,
    },
    /// Generating the signed download URL failed.
    #[error("failed to sign download URL for '{key}' in bucket '{bucket}': {detail}")]
    Presign {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Provider error detail.
        detail: String,
    },
    /// The backend could not be accessed.
    #[error("object store unavailable: {detail}")]
    Unavailable {
        /// Reason the backend is unavailable.
        detail: String,
    },
}

/// Convenience alias for object store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Primary error type for the deployment pipeline.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Object store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// Source client error.
        source: reqwest::Error,
    },
    /// An API base URL cannot carry path segments.
    #[error("API base URL '{base}' cannot be used as a base")]
    InvalidEndpoint {
        /// Offending base URL.
        base: String,
    },
    /// Sending a request failed before a response arrived.
    #[error("request to {endpoint} failed: {source}")]
    Request {
        /// Endpoint label.
        endpoint: &'static str,
        /// Source client error.
        source: reqwest::Error,
    },
    /// The remote API answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        /// Endpoint label.
        endpoint: &'static str,
        /// HTTP status code.
        status: StatusCode,
        /// Truncated response body.
        body: String,
    },
    /// A response body could not be read or decoded.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        /// Endpoint label.
        endpoint: &'static str,
        /// Source client error.
        source: reqwest::Error,
    },
    /// The platform reported the app setup as failed.
    #[error("app setup {setup_id} for '{app_name}' failed: {reason}")]
    SetupFailed {
        /// Application name.
        app_name: String,
        /// App setup identifier.
        setup_id: String,
        /// Failure message reported by the platform.
        reason: String,
    },
    /// The app setup did not finish within the poll budget.
    #[error("app setup {setup_id} for '{app_name}' still pending after {attempts} status checks")]
    SetupTimedOut {
        /// Application name.
        app_name: String,
        /// App setup identifier.
        setup_id: String,
        /// Status checks performed.
        attempts: u32,
    },
}

/// Convenience alias for pipeline results.
pub type DeployResult<T> = Result<T, DeployError>;
