//! The four deployment stages wired in order.

use std::sync::Arc;

use dpod_config::DeployConfig;
use reqwest::Client;
use tracing::info;

use crate::archive::ArchiveFetcher;
use crate::error::{DeployError, DeployResult};
use crate::platform::{AppUrl, HerokuClient};
use crate::poll::{PollOutcome, poll_setup};
use crate::storage::{ObjectStore, Stager};

/// Runs a deployment from archive fetch to provisioned app.
pub struct Deployer {
    config: DeployConfig,
    archives: ArchiveFetcher,
    stager: Stager,
    platform: HerokuClient,
}

impl Deployer {
    /// Assemble the pipeline from resolved configuration and a storage backend.
    #[must_use]
    pub fn new(config: DeployConfig, client: Client, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            archives: ArchiveFetcher::new(client.clone()),
            stager: Stager::new(store),
            platform: HerokuClient::new(client, config.platform.clone()),
            config,
        }
    }

    /// Deploy the configured branch and return the application's URL.
    ///
    /// # Errors
    ///
    /// Returns an error when any stage fails, when the platform reports the
    /// setup as failed, or when the setup does not finish within the poll
    /// budget.
    pub async fn run(&self) -> DeployResult<AppUrl> {
        self.stager.ensure_bucket().await?;

        let archive = self.archives.fetch(&self.config.source).await?;
        let handle = self.stager.upload(archive).await?;
        let source_url = self.stager.signed_url(&handle).await?;

        let setup = self.platform.create_app_setup(&source_url).await?;
        match poll_setup(&self.platform, &setup.id, self.config.poll).await? {
            PollOutcome::Succeeded => {
                let url = AppUrl::for_app(&setup.app_name);
                info!(app = %setup.app_name, url = %url, "deployment complete");
                Ok(url)
            }
            PollOutcome::Failed(reason) => Err(DeployError::SetupFailed {
                app_name: setup.app_name,
                setup_id: setup.id,
                reason,
            }),
            PollOutcome::TimedOut { attempts } => Err(DeployError::SetupTimedOut {
                app_name: setup.app_name,
                setup_id: setup.id,
                attempts,
            }),
        }
    }
}
