//! Branch tarball download from the GitHub archive API.

use bytes::Bytes;
use dpod_config::SourceHostConfig;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{DeployError, DeployResult};
use crate::http::{endpoint, ensure_success};

const ENDPOINT: &str = "GitHub archive";

/// Downloads repository snapshots.
#[derive(Clone)]
pub struct ArchiveFetcher {
    client: Client,
}

impl ArchiveFetcher {
    /// Create a fetcher using the shared HTTP client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// URL of the tarball for the configured branch.
    ///
    /// Branch names containing `/` are kept as separate path segments.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidEndpoint`] when the API base is unusable.
    pub fn archive_url(config: &SourceHostConfig) -> DeployResult<Url> {
        let segments = ["repos", config.owner.as_str(), config.repo.as_str(), "tarball"]
            .into_iter()
            .chain(config.branch.split('/'));
        endpoint(&config.api_base, segments)
    }

    /// Download the whole tarball into memory.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails, the API answers with a
    /// non-success status, or the body cannot be read.
    pub async fn fetch(&self, config: &SourceHostConfig) -> DeployResult<Bytes> {
        let url = Self::archive_url(config)?;
        debug!(url = %url, "requesting archive");

        let response = self
            .client
            .get(url)
            .basic_auth("token", Some(&config.token))
            .send()
            .await
            .map_err(|source| DeployError::Request {
                endpoint: ENDPOINT,
                source,
            })?;
        let response = ensure_success(response, ENDPOINT).await?;

        let archive = response
            .bytes()
            .await
            .map_err(|source| DeployError::Decode {
                endpoint: ENDPOINT,
                source,
            })?;

        info!(
            owner = %config.owner,
            repo = %config.repo,
            branch = %config.branch,
            size = archive.len(),
            "archive downloaded"
        );
        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn source_config(api_base: &str, branch: &str) -> SourceHostConfig {
        SourceHostConfig {
            token: "T".into(),
            owner: "alice".into(),
            repo: "myapp".into(),
            branch: branch.into(),
            api_base: api_base.parse().expect("valid URL"),
        }
    }

    #[test]
    fn archive_url_templates_owner_repo_and_branch() {
        let url = ArchiveFetcher::archive_url(&source_config("https://api.github.com", "main"))
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/alice/myapp/tarball/main"
        );
    }

    #[test]
    fn archive_url_splits_nested_branch_names() {
        let url = ArchiveFetcher::archive_url(&source_config(
            "https://api.github.com",
            "feature/login",
        ))
        .expect("url");
        assert_eq!(url.path(), "/repos/alice/myapp/tarball/feature/login");
    }

    #[tokio::test]
    async fn fetch_returns_body_with_token_auth() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/alice/myapp/tarball/main")
                .header("authorization", "Basic dG9rZW46VA==");
            then.status(200).body("tarball-bytes");
        });

        let fetcher = ArchiveFetcher::new(Client::new());
        let archive = fetcher
            .fetch(&source_config(&server.base_url(), "main"))
            .await?;

        mock.assert();
        assert_eq!(archive.as_ref(), b"tarball-bytes");
        Ok(())
    }

    #[tokio::test]
    async fn fetch_fails_on_non_success_status() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/repos/alice/myapp/tarball/main");
            then.status(401).body("{\"message\":\"Bad credentials\"}");
        });

        let fetcher = ArchiveFetcher::new(Client::new());
        let err = fetcher
            .fetch(&source_config(&server.base_url(), "main"))
            .await
            .expect_err("401 should fail");

        assert!(matches!(
            err,
            DeployError::Status { status, .. } if status.as_u16() == 401
        ));
        Ok(())
    }
}
