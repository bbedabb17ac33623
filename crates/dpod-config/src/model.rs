//! Immutable configuration records passed down the deployment pipeline.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::defaults::{ARCHIVE_KEY, BUCKET_PREFIX, MAX_POLL_ATTEMPTS, POLL_INTERVAL};
use crate::error::{ConfigError, ConfigResult};

/// Source host (GitHub) access for the repository being deployed.
#[derive(Clone)]
pub struct SourceHostConfig {
    /// Personal access token.
    pub token: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch to snapshot.
    pub branch: String,
    /// REST API base URL.
    pub api_base: Url,
}

impl fmt::Debug for SourceHostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHostConfig")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

/// Staging location for the archive in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    /// Bucket holding staged archives.
    pub bucket: String,
    /// Key the archive is written to.
    pub key: String,
}

impl ObjectStoreConfig {
    /// Derive the staging location for an account.
    ///
    /// The bucket is the fixed prefix followed by the lower-cased identifier so
    /// the same account always maps to the same bucket.
    #[must_use]
    pub fn for_account(account_id: &str) -> Self {
        Self {
            bucket: format!("{BUCKET_PREFIX}{}", account_id.to_lowercase()),
            key: ARCHIVE_KEY.to_string(),
        }
    }
}

/// Hosting platform (Heroku) access.
#[derive(Clone)]
pub struct PlatformConfig {
    /// API token taken from the credential file.
    pub token: String,
    /// Platform API base URL.
    pub api_base: Url,
}

impl fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

/// Timing of app-setup status checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each status check.
    pub interval: Duration,
    /// Status checks performed before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

/// Everything a deployment needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Source host access and repository coordinates.
    pub source: SourceHostConfig,
    /// Platform access.
    pub platform: PlatformConfig,
    /// Status polling policy.
    pub poll: PollPolicy,
}

/// Parse an endpoint override into an absolute URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when `value` is not an absolute URL.
pub fn parse_api_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    value
        .trim()
        .parse::<Url>()
        .map_err(|source| ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
            source,
        })
}
