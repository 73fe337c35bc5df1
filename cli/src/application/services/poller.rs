//! Poller: bounded wait for a discovery task to reach a state.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use crate::application::ports::{Clock, DiscoveryTaskApi};
use crate::domain::{DiscoveryError, TaskKind, TaskState};

/// Spacing and bounds of one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
    /// Consecutive failed or `UNKNOWN` reads tolerated before giving up.
    pub max_read_failures: u32,
}

/// Result of a wait that did not hit the read-failure budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The predicate held for `state` on read number `reads`.
    Satisfied { state: TaskState, reads: u32 },
    /// Time ran out. `last_state` is the last recognised state, if any.
    TimedOut {
        last_state: Option<TaskState>,
        reads: u32,
    },
}

/// Re-read the task every `interval` until `predicate` holds or `timeout`
/// has elapsed.
///
/// The first read happens immediately. Timeout is checked after each read,
/// so a wait never ends before `timeout` unless the predicate held.
///
/// # Errors
///
/// Returns [`DiscoveryError::TaskRead`] once more than
/// `max_read_failures` consecutive reads failed or returned `UNKNOWN`.
pub async fn poll(
    api: &impl DiscoveryTaskApi,
    clock: &impl Clock,
    kind: TaskKind,
    cfg: PollConfig,
    predicate: impl Fn(&TaskState) -> bool,
) -> Result<PollOutcome, DiscoveryError> {
    let started = clock.now();
    let mut reads = 0u32;
    let mut consecutive_failures = 0u32;
    let mut last_state: Option<TaskState> = None;

    loop {
        reads += 1;
        match api.get_task(kind).await {
            Ok(task) if !task.state.is_unknown() => {
                consecutive_failures = 0;
                if last_state.as_ref() != Some(&task.state) {
                    tracing::info!(task = %kind, state = %task.state, read = reads, "observed state");
                }
                if predicate(&task.state) {
                    return Ok(PollOutcome::Satisfied {
                        state: task.state,
                        reads,
                    });
                }
                last_state = Some(task.state);
            }
            outcome => {
                consecutive_failures += 1;
                let reason = match outcome {
                    Ok(task) => format!("unrecognised state {}", task.state),
                    Err(e) => format!("{e:#}"),
                };
                tracing::warn!(
                    task = %kind,
                    read = reads,
                    failures = consecutive_failures,
                    %reason,
                    "state read failed while polling"
                );
                if consecutive_failures > cfg.max_read_failures {
                    return Err(DiscoveryError::TaskRead {
                        task: kind,
                        reason: format!(
                            "{consecutive_failures} consecutive failed reads while polling (last: {reason})"
                        ),
                    });
                }
            }
        }

        let elapsed = clock.now().saturating_duration_since(started);
        if elapsed >= cfg.timeout {
            return Ok(PollOutcome::TimedOut { last_state, reads });
        }
        // Never sleep past the deadline.
        clock.sleep(cfg.interval.min(cfg.timeout.saturating_sub(elapsed))).await;
    }
}
