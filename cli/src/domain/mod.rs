//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod network;
pub mod task;

pub use config::{DiscoveryConfig, PollSettings, RunConfig, ScanSettings};
pub use error::{ConfigError, DiscoveryError};
pub use network::{Network, NetworkAssignment, NetworkFilter, NetworkRef};
pub use task::{ControlCommand, DiscoveryTask, TaskKind, TaskMode, TaskRef, TaskState};
