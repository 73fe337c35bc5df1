//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::time::Duration;

use thiserror::Error;

use crate::domain::task::{ControlCommand, TaskKind, TaskState};

// ── Config errors ─────────────────────────────────────────────────────────────

/// Every problem found while validating a configuration file.
#[derive(Debug, Error)]
#[error("Configuration is invalid:\n  - {}", .problems.join("\n  - "))]
pub struct ConfigError {
    pub problems: Vec<String>,
}

// ── Run errors ────────────────────────────────────────────────────────────────

/// Failure kinds of a discovery run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot read the network inventory: {reason}")]
    InventoryRead { reason: String },

    #[error("No networks flagged for discovery in view '{view}' and no fallback network configured.")]
    NoEligibleNetworks { view: String },

    #[error("No networks flagged for discovery in view '{view}', and fallback network {cidr} was not found there.")]
    FallbackNotFound { cidr: String, view: String },

    #[error("Cannot read the {task} discovery task: {reason}")]
    TaskRead { task: TaskKind, reason: String },

    #[error("The appliance rejected {command} for the {task} discovery task: {reason}")]
    ControlFailed {
        task: TaskKind,
        command: ControlCommand,
        reason: String,
    },

    #[error(
        "The {task} discovery task did not stop within {}s (last state: {last_state}). Networks were not changed.",
        .waited.as_secs()
    )]
    StopTimeout {
        task: TaskKind,
        last_state: TaskState,
        waited: Duration,
    },

    #[error("Updating the networks of the {task} discovery task failed: {reason}")]
    UpdateFailed { task: TaskKind, reason: String },

    #[error(
        "The {task} discovery task was started but is not RUNNING yet (last state: {last_state}). Check the appliance."
    )]
    StartNotConfirmed { task: TaskKind, last_state: TaskState },

    #[error("Cannot confirm stopping the {task} discovery task: {reason}")]
    ConfirmationUnavailable { task: TaskKind, reason: String },

    #[error("Aborted. The {task} discovery task was left untouched.")]
    UserAborted { task: TaskKind },
}

impl DiscoveryError {
    /// A declined confirmation ends the run cleanly rather than as a failure.
    #[must_use]
    pub fn is_clean_exit(&self) -> bool {
        matches!(self, Self::UserAborted { .. })
    }
}
