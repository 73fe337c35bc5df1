//! Discovery task vocabulary: task identity, observed states, control commands.
//!
//! Pure types only: no I/O, no async.

use std::fmt;

use crate::domain::network::NetworkRef;

// ── Task identity ────────────────────────────────────────────────────────────

/// Which of the appliance's two discovery tasks a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TaskKind {
    /// Runs on the appliance's own schedule; reconfigured without a stop.
    Scheduled,
    /// On-demand task; stopped, reconfigured, then restarted.
    Current,
}

impl TaskKind {
    /// Value of `discovery_task_oid` identifying this task on the appliance.
    #[must_use]
    pub fn oid(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Current => "current",
        }
    }

    #[must_use]
    pub fn mode(self) -> TaskMode {
        match self {
            Self::Scheduled => TaskMode::Scheduled,
            Self::Current => TaskMode::OnDemand,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.oid())
    }
}

/// How the appliance triggers the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMode {
    Scheduled,
    OnDemand,
}

impl fmt::Display for TaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scheduled => "scheduled",
            Self::OnDemand => "on-demand",
        })
    }
}

/// Opaque appliance reference of a discovery task (`discoverytask/...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskRef(pub String);

impl TaskRef {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Observed state ───────────────────────────────────────────────────────────

/// Task state as reported by the appliance.
///
/// The vocabulary belongs to the appliance, so anything unrecognised is kept
/// verbatim in [`TaskState::Unknown`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Stopped,
    Running,
    Paused,
    EndPending,
    Starting,
    Complete,
    Error,
    Unknown(String),
}

impl TaskState {
    /// Parse the appliance's state string. Matching ignores ASCII case.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "STOPPED" => Self::Stopped,
            "RUNNING" => Self::Running,
            "PAUSED" => Self::Paused,
            "END_PENDING" => Self::EndPending,
            "STARTING" => Self::Starting,
            "COMPLETE" => Self::Complete,
            "ERROR" => Self::Error,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// States in which the assigned networks may be rewritten.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        matches!(self, Self::Stopped | Self::Complete | Self::Error)
    }

    /// States that require an END before the task can be reconfigured.
    #[must_use]
    pub fn requires_stop(&self) -> bool {
        matches!(
            self,
            Self::Running | Self::Paused | Self::EndPending | Self::Starting
        )
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("STOPPED"),
            Self::Running => f.write_str("RUNNING"),
            Self::Paused => f.write_str("PAUSED"),
            Self::EndPending => f.write_str("END_PENDING"),
            Self::Starting => f.write_str("STARTING"),
            Self::Complete => f.write_str("COMPLETE"),
            Self::Error => f.write_str("ERROR"),
            Self::Unknown(raw) if raw.is_empty() => f.write_str("UNKNOWN"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
        }
    }
}

// ── Task snapshot ────────────────────────────────────────────────────────────

/// Local, possibly stale copy of a discovery task.
#[derive(Debug, Clone)]
pub struct DiscoveryTask {
    pub kind: TaskKind,
    pub reference: TaskRef,
    pub state: TaskState,
    /// Free-text status line reported alongside the state.
    pub status: Option<String>,
    pub networks: Vec<NetworkRef>,
    pub network_view: Option<String>,
}

impl DiscoveryTask {
    #[must_use]
    pub fn mode(&self) -> TaskMode {
        self.kind.mode()
    }
}

// ── Control ──────────────────────────────────────────────────────────────────

/// Actions accepted by `network_discovery_control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    End,
}

impl ControlCommand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::End => "END",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
