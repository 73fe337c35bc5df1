//! Task lifecycle controller: stop, reconfigure, restart.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! Networks are only ever written after the most recent read showed a
//! quiescent state. Nothing here retries a failed command.

use crate::application::ports::{Clock, ConfirmationGate, DiscoveryTaskApi, ProgressReporter};
use crate::application::services::poller::{PollConfig, PollOutcome, poll};
use crate::application::services::task_reader::read_known_task;
use crate::domain::{
    ControlCommand, DiscoveryError, DiscoveryTask, NetworkAssignment, NetworkRef, PollSettings,
    TaskKind, TaskRef, TaskState,
};

/// Injected collaborators of a restart.
pub struct Controller<'a, A, C, G: ?Sized, R> {
    pub api: &'a A,
    pub clock: &'a C,
    pub gate: &'a G,
    pub reporter: &'a R,
    pub poll: PollSettings,
}

/// Successful restart of an on-demand task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartOutcome {
    pub final_state: TaskState,
    pub networks: Vec<NetworkRef>,
    /// `true` when the task had to be ended first.
    pub stopped_first: bool,
}

/// Successful network update of a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub reference: TaskRef,
    pub networks: Vec<NetworkRef>,
}

impl<A, C, G, R> Controller<'_, A, C, G, R>
where
    A: DiscoveryTaskApi,
    C: Clock,
    G: ConfirmationGate + ?Sized,
    R: ProgressReporter,
{
    /// Drive the task to a stopped state, assign `assignment`, start it and
    /// confirm it is running.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::TaskRead`] if the state cannot be read.
    /// - [`DiscoveryError::UserAborted`] if the stop was declined. Nothing was changed.
    /// - [`DiscoveryError::ConfirmationUnavailable`] if nobody could be asked. Nothing was changed.
    /// - [`DiscoveryError::ControlFailed`] if END or START was rejected.
    /// - [`DiscoveryError::StopTimeout`] if the task did not stop in time.
    /// - [`DiscoveryError::UpdateFailed`] if the network write was rejected.
    /// - [`DiscoveryError::StartNotConfirmed`] if RUNNING was not observed after START.
    pub async fn reconfigure_and_restart(
        &self,
        kind: TaskKind,
        assignment: &NetworkAssignment,
    ) -> Result<RestartOutcome, DiscoveryError> {
        let task = read_known_task(self.api, kind).await?;
        self.reporter
            .step(&format!("{kind} discovery is {}", task.state));

        let stopped_first = task.state.requires_stop();
        if stopped_first {
            self.stop(&task).await?;
        }

        apply_networks(self.api, self.reporter, &task, assignment).await?;
        let final_state = self.start(&task).await?;

        Ok(RestartOutcome {
            final_state,
            networks: assignment.networks.clone(),
            stopped_first,
        })
    }

    async fn stop(&self, task: &DiscoveryTask) -> Result<(), DiscoveryError> {
        let kind = task.kind;
        match self.gate.approve("stop", task) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(task = %kind, state = %task.state, "stop declined, leaving task untouched");
                return Err(DiscoveryError::UserAborted { task: kind });
            }
            Err(e) => {
                tracing::error!(task = %kind, state = %task.state, error = %format!("{e:#}"), "no confirmation available");
                return Err(DiscoveryError::ConfirmationUnavailable {
                    task: kind,
                    reason: format!("{e:#}"),
                });
            }
        }

        self.reporter.step(&format!("ending {kind} discovery..."));
        control(self.api, task, ControlCommand::End).await?;

        let cfg = PollConfig {
            interval: self.poll.interval,
            timeout: self.poll.stop_timeout,
            max_read_failures: self.poll.max_read_failures,
        };
        match poll(self.api, self.clock, kind, cfg, TaskState::is_quiescent).await? {
            PollOutcome::Satisfied { state, reads } => {
                tracing::info!(task = %kind, %state, reads, "task stopped");
                self.reporter.success(&format!("{kind} discovery stopped ({state})"));
                Ok(())
            }
            PollOutcome::TimedOut { last_state, reads } => {
                let last_state = last_state.unwrap_or_else(|| task.state.clone());
                tracing::error!(
                    task = %kind,
                    state = %last_state,
                    reads,
                    timeout_secs = cfg.timeout.as_secs(),
                    "timed out waiting for task to stop"
                );
                Err(DiscoveryError::StopTimeout {
                    task: kind,
                    last_state,
                    waited: cfg.timeout,
                })
            }
        }
    }

    async fn start(&self, task: &DiscoveryTask) -> Result<TaskState, DiscoveryError> {
        let kind = task.kind;
        self.reporter.step(&format!("starting {kind} discovery..."));
        control(self.api, task, ControlCommand::Start).await?;

        let cfg = PollConfig {
            interval: self.poll.interval,
            timeout: self.poll.start_timeout,
            max_read_failures: self.poll.max_read_failures,
        };
        match poll(self.api, self.clock, kind, cfg, TaskState::is_running).await? {
            PollOutcome::Satisfied { state, reads } => {
                tracing::info!(task = %kind, %state, reads, "start confirmed");
                self.reporter.success(&format!("{kind} discovery is {state}"));
                Ok(state)
            }
            PollOutcome::TimedOut { last_state, reads } => {
                let last_state = last_state.unwrap_or(TaskState::Unknown(String::new()));
                tracing::error!(
                    task = %kind,
                    state = %last_state,
                    reads,
                    "start issued but RUNNING not observed"
                );
                Err(DiscoveryError::StartNotConfirmed {
                    task: kind,
                    last_state,
                })
            }
        }
    }
}

/// Assign networks to a scheduled task without stopping or starting it.
///
/// # Errors
///
/// Returns [`DiscoveryError::UpdateFailed`] if the write was rejected.
pub async fn schedule_update(
    api: &impl DiscoveryTaskApi,
    reporter: &impl ProgressReporter,
    task: &DiscoveryTask,
    assignment: &NetworkAssignment,
) -> Result<UpdateOutcome, DiscoveryError> {
    apply_networks(api, reporter, task, assignment).await?;
    Ok(UpdateOutcome {
        reference: task.reference.clone(),
        networks: assignment.networks.clone(),
    })
}

async fn apply_networks(
    api: &impl DiscoveryTaskApi,
    reporter: &impl ProgressReporter,
    task: &DiscoveryTask,
    assignment: &NetworkAssignment,
) -> Result<(), DiscoveryError> {
    let kind = task.kind;
    tracing::info!(
        task = %kind,
        reference = %task.reference,
        networks = assignment.networks.len(),
        view = %assignment.network_view,
        "updating assigned networks"
    );
    match api.set_networks(&task.reference, assignment).await {
        Ok(()) => {
            reporter.success(&format!(
                "{kind} discovery now covers {} network(s) in view '{}'",
                assignment.networks.len(),
                assignment.network_view
            ));
            Ok(())
        }
        Err(e) => {
            tracing::error!(task = %kind, reference = %task.reference, error = %format!("{e:#}"), "network update rejected");
            Err(DiscoveryError::UpdateFailed {
                task: kind,
                reason: format!("{e:#}"),
            })
        }
    }
}

async fn control(
    api: &impl DiscoveryTaskApi,
    task: &DiscoveryTask,
    command: ControlCommand,
) -> Result<(), DiscoveryError> {
    tracing::info!(task = %task.kind, reference = %task.reference, %command, "sending control command");
    api.send_control(&task.reference, command).await.map_err(|e| {
        tracing::error!(task = %task.kind, %command, error = %format!("{e:#}"), "control command rejected");
        DiscoveryError::ControlFailed {
            task: task.kind,
            command,
            reason: format!("{e:#}"),
        }
    })
}
