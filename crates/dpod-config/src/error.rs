//! Error types for configuration resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment value was absent or blank.
    #[error("environment variable {name} is not set")]
    MissingEnv {
        /// Name of the variable.
        name: &'static str,
    },
    /// A git remote URL could not be split into owner and repository.
    #[error("malformed git remote URL '{url}': {reason}")]
    RemoteUrlMalformed {
        /// Remote URL as configured.
        url: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The working directory is not inside a readable git repository.
    #[error("failed to open git repository at {path}: {detail}")]
    RepositoryOpen {
        /// Path the discovery started from.
        path: PathBuf,
        /// Underlying repository error.
        detail: String,
    },
    /// The named remote has no URL configured.
    #[error("git remote '{remote}' has no URL configured")]
    RemoteMissing {
        /// Remote name that was looked up.
        remote: String,
    },
    /// HEAD could not be resolved to a branch.
    #[error("failed to determine current branch: {detail}")]
    BranchUnavailable {
        /// Reason the branch is unavailable.
        detail: String,
    },
    /// The credential file could not be read.
    #[error("failed to read credential file {path}")]
    NetrcRead {
        /// Path of the credential file.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The credential file contained an unterminated key/value pair.
    #[error("credential file is malformed: '{token}' is missing a value")]
    NetrcParse {
        /// Keyword that was missing its value.
        token: String,
    },
    /// The credential file has no entry for the requested host.
    #[error("no credential entry for host '{host}' in {path}")]
    NetrcHostMissing {
        /// Host that was looked up.
        host: String,
        /// Path of the credential file.
        path: PathBuf,
    },
    /// The credential entry for the host has no password/token.
    #[error("credential entry for host '{host}' has no password")]
    NetrcPasswordMissing {
        /// Host that was looked up.
        host: String,
    },
    /// No credential file location could be determined.
    #[error("unable to locate a credential file; set NETRC or a home directory")]
    NetrcPathUnknown,
    /// An endpoint override was not a valid absolute URL.
    #[error("invalid {field} URL '{value}'")]
    InvalidUrl {
        /// Name of the field carrying the URL.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Source URL parser error.
        source: url::ParseError,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
