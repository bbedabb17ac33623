//! Shared client wiring and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use dpod_config::ConfigError;
use dpod_deploy::{DeployError, build_client};
use reqwest::Client;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::validation(error.to_string())
    }
}

impl From<DeployError> for CliError {
    fn from(error: DeployError) -> Self {
        Self::failure(error)
    }
}

/// Dependencies constructed once from CLI options.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) client: Client,
}

impl CliDependencies {
    /// Construct the shared HTTP client tagged with the invocation's trace id.
    pub(crate) fn new(timeout_secs: u64, trace_id: &str) -> CliResult<Self> {
        let client = build_client(Duration::from_secs(timeout_secs), trace_id)
            .map_err(|err| CliError::failure(anyhow!(err)))?;
        Ok(Self { client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpod_deploy::StoreError;

    #[test]
    fn config_errors_are_validation_failures() {
        let err = CliError::from(ConfigError::MissingEnv {
            name: "GITHUB_API_TOKEN",
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.display_message(),
            "environment variable GITHUB_API_TOKEN is not set"
        );
    }

    #[test]
    fn operational_errors_are_failures() {
        let err = CliError::from(DeployError::Store(StoreError::Unavailable {
            detail: "offline".into(),
        }));
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("offline"));
    }
}
