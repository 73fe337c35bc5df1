//! Unit tests for discoveryctl
//!
//! These tests drive the services through in-memory appliances and run fast
//! without network I/O.

mod config_resolution;
mod mocks;
