//! Bounded polling of app-setup status.

use dpod_config::PollPolicy;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::DeployResult;
use crate::platform::{SetupStatus, SetupStatusSource};

/// Terminal result of polling an app setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The platform reported success.
    Succeeded,
    /// The platform reported failure with the given reason.
    Failed(String),
    /// No terminal status was seen within the attempt budget.
    TimedOut {
        /// Status checks performed.
        attempts: u32,
    },
}

/// Poll `setup_id` until it reaches a terminal status or the budget runs out.
///
/// Each attempt sleeps for the policy interval before checking, so a status
/// is never requested immediately after creation.
///
/// # Errors
///
/// Returns an error when a status request itself fails.
pub async fn poll_setup<S>(
    source: &S,
    setup_id: &str,
    policy: PollPolicy,
) -> DeployResult<PollOutcome>
where
    S: SetupStatusSource + ?Sized,
{
    let mut last_status: Option<String> = None;

    for attempt in 1..=policy.max_attempts {
        sleep(policy.interval).await;

        match source.setup_status(setup_id).await? {
            SetupStatus::Succeeded => {
                info!(setup_id = %setup_id, attempt, "app setup succeeded");
                return Ok(PollOutcome::Succeeded);
            }
            SetupStatus::Failed(reason) => {
                info!(setup_id = %setup_id, attempt, reason = %reason, "app setup failed");
                return Ok(PollOutcome::Failed(reason));
            }
            SetupStatus::Pending(status) => {
                if last_status.as_deref() == Some(status.as_str()) {
                    debug!(setup_id = %setup_id, status = %status, attempt, "app setup unchanged");
                } else {
                    info!(setup_id = %setup_id, status = %status, "app setup in progress");
                }
                last_status = Some(status);
            }
        }
    }

    Ok(PollOutcome::TimedOut {
        attempts: policy.max_attempts,
    })
}
