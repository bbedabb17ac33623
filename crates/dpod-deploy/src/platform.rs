//! Heroku Platform API client for app setups.

use std::fmt::{self, Display, Formatter};

use async_trait::async_trait;
use dpod_config::PlatformConfig;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DeployError, DeployResult};
use crate::http::{endpoint, ensure_success};

/// Accept header selecting version 3 of the Platform API.
pub const HEROKU_ACCEPT: &str = "application/vnd.heroku+json; version=3";

const CREATE_ENDPOINT: &str = "Heroku app-setup create";
const INFO_ENDPOINT: &str = "Heroku app-setup info";

/// Identifiers returned when an app setup is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSetup {
    /// Name of the application being provisioned.
    pub app_name: String,
    /// Identifier of the setup operation.
    pub id: String,
}

/// Status of an app setup as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStatus {
    /// Still provisioning; carries the raw status string.
    Pending(String),
    /// Provisioning finished successfully.
    Succeeded,
    /// Provisioning failed; carries the platform's reason.
    Failed(String),
}

impl SetupStatus {
    /// Classify a raw status string. Only an exact `succeeded` counts as success.
    #[must_use]
    pub fn from_parts(status: &str, failure_message: Option<String>) -> Self {
        match status {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed(
                failure_message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "no failure message reported".to_string()),
            ),
            other => Self::Pending(other.to_string()),
        }
    }
}

/// Public URL of a deployed application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUrl(String);

impl AppUrl {
    /// URL of `app_name` under the platform's default subdomain.
    #[must_use]
    pub fn for_app(app_name: &str) -> Self {
        Self(format!("http://{app_name}.herokuapp.com"))
    }

    /// URL as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for AppUrl {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Source of app-setup status reports.
#[async_trait]
pub trait SetupStatusSource: Send + Sync {
    /// Fetch the current status of setup `id`.
    async fn setup_status(&self, id: &str) -> DeployResult<SetupStatus>;
}

/// Client for the app-setup endpoints.
#[derive(Clone)]
pub struct HerokuClient {
    client: Client,
    config: PlatformConfig,
}

impl HerokuClient {
    /// Create a client using the shared HTTP client.
    #[must_use]
    pub const fn new(client: Client, config: PlatformConfig) -> Self {
        Self { client, config }
    }

    /// Submit `source_url` as the source blob of a new app setup.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails, the API answers with a
    /// non-success status, or the response cannot be decoded.
    pub async fn create_app_setup(&self, source_url: &str) -> DeployResult<AppSetup> {
        let url = endpoint(&self.config.api_base, ["app-setups"])?;
        let payload = AppSetupRequest {
            source_blob: SourceBlob { url: source_url },
        };

        let response = self
            .authorize(self.client.post(url))
            .json(&payload)
            .send()
            .await
            .map_err(|source| DeployError::Request {
                endpoint: CREATE_ENDPOINT,
                source,
            })?;
        let body = ensure_success(response, CREATE_ENDPOINT)
            .await?
            .json::<AppSetupResponse>()
            .await
            .map_err(|source| DeployError::Decode {
                endpoint: CREATE_ENDPOINT,
                source,
            })?;

        info!(app = %body.app.name, setup_id = %body.id, "app setup created");
        Ok(AppSetup {
            app_name: body.app.name,
            id: body.id,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth("", Some(&self.config.token))
            .header(ACCEPT, HEROKU_ACCEPT)
    }
}

#[async_trait]
impl SetupStatusSource for HerokuClient {
    async fn setup_status(&self, id: &str) -> DeployResult<SetupStatus> {
        let url = endpoint(&self.config.api_base, ["app-setups", id])?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|source| DeployError::Request {
                endpoint: INFO_ENDPOINT,
                source,
            })?;
        let body = ensure_success(response, INFO_ENDPOINT)
            .await?
            .json::<AppSetupInfo>()
            .await
            .map_err(|source| DeployError::Decode {
                endpoint: INFO_ENDPOINT,
                source,
            })?;

        debug!(setup_id = %id, status = %body.status, "app setup status");
        Ok(SetupStatus::from_parts(&body.status, body.failure_message))
    }
}

#[derive(Debug, Serialize)]
struct AppSetupRequest<'a> {
    source_blob: SourceBlob<'a>,
}

#[derive(Debug, Serialize)]
struct SourceBlob<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct AppSetupResponse {
    id: String,
    app: AppRef,
}

#[derive(Debug, Deserialize)]
struct AppRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AppSetupInfo {
    status: String,
    #[serde(default)]
    failure_message: Option<String>,
}
