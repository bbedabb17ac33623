//! Fixed names, endpoints and timings used when resolving a deployment.
//!
//! # Design
//! - Keep every literal the pipeline depends on in one place.
//! - Values here are defaults; the CLI may override endpoints and poll timing.

use std::time::Duration;

/// Environment variable holding the GitHub access token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_API_TOKEN";
/// Default GitHub REST endpoint.
pub const GITHUB_API_URL: &str = "https://api.github.com";
/// Default Heroku platform endpoint.
pub const HEROKU_API_URL: &str = "https://api.heroku.com";
/// Netrc machine entry holding the Heroku token.
pub const HEROKU_NETRC_HOST: &str = "api.heroku.com";
/// Git remote consulted when no override is supplied.
pub const DEFAULT_REMOTE: &str = "origin";
/// Prefix of the staging bucket name; the account identifier follows.
pub const BUCKET_PREFIX: &str = "dpod-";
/// Object key the archive is staged under.
pub const ARCHIVE_KEY: &str = "app.tgz";
/// Validity window of the signed archive URL.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(60);
/// Retention applied to staged objects by the bucket lifecycle rule.
pub const ARCHIVE_RETENTION_DAYS: i32 = 1;
/// Identifier of the bucket lifecycle rule.
pub const LIFECYCLE_RULE_ID: &str = "expire keys after one day";
/// Delay between app-setup status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Status checks performed before giving up (30 minutes at the default interval).
pub const MAX_POLL_ATTEMPTS: u32 = 360;
