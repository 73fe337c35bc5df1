//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the WAPI client, the
//! configuration file, terminal prompts, timers, and the log sink.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod clock;
pub mod config;
pub mod gate;
pub mod logging;
pub mod wapi;
