//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::domain::{
    ControlCommand, DiscoveryTask, Network, NetworkAssignment, NetworkFilter, TaskKind, TaskRef,
};

// ── Appliance Ports ───────────────────────────────────────────────────────────

/// Read access to the appliance's network inventory.
#[allow(async_fn_in_trait)]
pub trait NetworkInventory {
    /// List networks matching `filter`, in the order the appliance returns them.
    async fn list_networks(&self, filter: &NetworkFilter) -> Result<Vec<Network>>;
}

/// Access to the appliance's discovery tasks.
#[allow(async_fn_in_trait)]
pub trait DiscoveryTaskApi {
    /// Fetch a fresh snapshot of the task identified by `kind`.
    async fn get_task(&self, kind: TaskKind) -> Result<DiscoveryTask>;
    /// Overwrite the task's assigned networks and scan settings.
    async fn set_networks(&self, task: &TaskRef, assignment: &NetworkAssignment) -> Result<()>;
    /// Send a START or END control action.
    async fn send_control(&self, task: &TaskRef, command: ControlCommand) -> Result<()>;
}

/// Composite trait: everything a discovery run needs from the appliance.
pub trait Appliance: NetworkInventory + DiscoveryTaskApi {}

/// Blanket implementation: any type implementing both sub-traits is an `Appliance`.
impl<T> Appliance for T where T: NetworkInventory + DiscoveryTaskApi {}

/// An authenticated appliance connection that must be released when the
/// run ends, whatever the outcome.
#[allow(async_fn_in_trait)]
pub trait Session: Appliance {
    /// Release the server-side session.
    async fn close(&self) -> Result<()>;
}

// ── Confirmation Port ─────────────────────────────────────────────────────────

/// Decides whether a disruptive action may proceed.
///
/// Chosen once per run; object-safe so the choice can be boxed.
pub trait ConfirmationGate {
    /// `Ok(true)` allows `action` on `task`, `Ok(false)` is an explicit
    /// decline.
    ///
    /// # Errors
    ///
    /// Returns an error when no answer can be obtained (no terminal).
    fn approve(&self, action: &str, task: &DiscoveryTask) -> Result<bool>;
}

// ── Time Port ─────────────────────────────────────────────────────────────────

/// Time source for polling, swappable for a manual clock in tests.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
