//! Resolution of the deployment configuration from explicit sources.
//!
//! # Design
//! - Callers capture ambient inputs (flags, environment) into [`ConfigSources`]
//!   once; nothing below reads process state on its own.
//! - Repository metadata is read through `gix` rather than `git` subprocesses.

use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::defaults::{GITHUB_TOKEN_ENV, HEROKU_NETRC_HOST};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{DeployConfig, PlatformConfig, PollPolicy, SourceHostConfig};
use crate::netrc::Netrc;
use crate::remote::parse_remote_url;

/// Inputs captured from flags and environment at startup.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// GitHub token, if one was supplied.
    pub github_token: Option<String>,
    /// Directory the repository is discovered from.
    pub repo_path: PathBuf,
    /// Remote whose URL names the GitHub repository.
    pub remote: String,
    /// Branch override; HEAD is used when absent.
    pub branch: Option<String>,
    /// Credential file override; `~/.netrc` is used when absent.
    pub netrc_path: Option<PathBuf>,
    /// GitHub API base URL.
    pub github_api_url: Url,
    /// Heroku API base URL.
    pub heroku_api_url: Url,
    /// Status polling policy.
    pub poll: PollPolicy,
}

/// Remote URL and branch read from a local repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    /// URL configured for the remote.
    pub remote_url: String,
    /// Short name of the checked-out branch.
    pub branch: String,
}

impl ConfigSources {
    /// Resolve the full deployment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the token is missing, the repository cannot be
    /// read, the remote is malformed, or the credential file lacks the
    /// platform entry.
    pub fn resolve(&self) -> ConfigResult<DeployConfig> {
        let source = self.resolve_source_host()?;
        let platform = self.resolve_platform()?;
        Ok(DeployConfig {
            source,
            platform,
            poll: self.poll,
        })
    }

    /// Resolve GitHub access and repository coordinates.
    ///
    /// # Errors
    ///
    /// See [`ConfigSources::resolve`].
    pub fn resolve_source_host(&self) -> ConfigResult<SourceHostConfig> {
        let token = self
            .github_token
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingEnv {
                name: GITHUB_TOKEN_ENV,
            })?
            .to_string();

        let metadata = read_repository_metadata(&self.repo_path, &self.remote)?;
        let remote = parse_remote_url(&metadata.remote_url)?;
        let branch = self
            .branch
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(metadata.branch);

        debug!(owner = %remote.owner, repo = %remote.repo, branch = %branch, "resolved source repository");

        Ok(SourceHostConfig {
            token,
            owner: remote.owner,
            repo: remote.repo,
            branch,
            api_base: self.github_api_url.clone(),
        })
    }

    /// Resolve platform access from the credential file.
    ///
    /// # Errors
    ///
    /// See [`ConfigSources::resolve`].
    pub fn resolve_platform(&self) -> ConfigResult<PlatformConfig> {
        let path = self.netrc_location()?;
        let netrc = Netrc::from_path(&path)?;
        let token = netrc.password_for(HEROKU_NETRC_HOST, &path)?.to_string();

        debug!(path = %path.display(), host = HEROKU_NETRC_HOST, "resolved platform credentials");

        Ok(PlatformConfig {
            token,
            api_base: self.heroku_api_url.clone(),
        })
    }

    fn netrc_location(&self) -> ConfigResult<PathBuf> {
        self.netrc_path
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".netrc")))
            .ok_or(ConfigError::NetrcPathUnknown)
    }
}

/// Read the remote URL and current branch of the repository containing `path`.
///
/// # Errors
///
/// Returns an error when no repository is found, the remote has no URL, or
/// HEAD does not point at a branch.
pub fn read_repository_metadata(path: &Path, remote: &str) -> ConfigResult<RepositoryMetadata> {
    let repo = gix::discover(path).map_err(|err| ConfigError::RepositoryOpen {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })?;

    let key = format!("remote.{remote}.url");
    let remote_url = repo
        .config_snapshot()
        .string(key.as_str())
        .map(|value| value.to_string())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::RemoteMissing {
            remote: remote.to_string(),
        })?;

    let head = repo
        .head_name()
        .map_err(|err| ConfigError::BranchUnavailable {
            detail: err.to_string(),
        })?
        .ok_or_else(|| ConfigError::BranchUnavailable {
            detail: "HEAD is detached".to_string(),
        })?;

    Ok(RepositoryMetadata {
        remote_url,
        branch: head.shorten().to_string(),
    })
}
