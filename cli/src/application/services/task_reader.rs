//! Task Reader: fetch a discovery task and turn read failures into
//! [`DiscoveryError::TaskRead`].
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::DiscoveryTaskApi;
use crate::domain::{DiscoveryError, DiscoveryTask, TaskKind};

/// Fetch a fresh snapshot of the task.
///
/// # Errors
///
/// Returns [`DiscoveryError::TaskRead`] if the appliance call fails.
pub async fn read_task(
    api: &impl DiscoveryTaskApi,
    kind: TaskKind,
) -> Result<DiscoveryTask, DiscoveryError> {
    match api.get_task(kind).await {
        Ok(task) => {
            tracing::info!(
                task = %kind,
                reference = %task.reference,
                state = %task.state,
                networks = task.networks.len(),
                "read discovery task"
            );
            Ok(task)
        }
        Err(e) => {
            tracing::error!(task = %kind, error = %format!("{e:#}"), "cannot read discovery task");
            Err(DiscoveryError::TaskRead {
                task: kind,
                reason: format!("{e:#}"),
            })
        }
    }
}

/// Fetch a task and require a recognised state.
///
/// # Errors
///
/// Returns [`DiscoveryError::TaskRead`] if the call fails or the state is
/// not one the controller understands.
pub async fn read_known_task(
    api: &impl DiscoveryTaskApi,
    kind: TaskKind,
) -> Result<DiscoveryTask, DiscoveryError> {
    let task = read_task(api, kind).await?;
    if task.state.is_unknown() {
        tracing::error!(task = %kind, state = %task.state, "unrecognised task state");
        return Err(DiscoveryError::TaskRead {
            task: kind,
            reason: format!("unrecognised state {}", task.state),
        });
    }
    Ok(task)
}
