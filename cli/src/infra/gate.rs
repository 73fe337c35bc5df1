//! Confirmation gates: interactive (`dialoguer`), forced, and unattended.

use anyhow::{Context, Result};

use crate::application::ports::ConfirmationGate;
use crate::domain::DiscoveryTask;

/// Asks on the terminal and waits for a yes/no answer. Defaults to "no".
pub struct InteractiveGate;

impl ConfirmationGate for InteractiveGate {
    fn approve(&self, action: &str, task: &DiscoveryTask) -> Result<bool> {
        let prompt = format!(
            "The {} discovery is {}. Do you want to {action} it and run a new discovery?",
            task.kind, task.state
        );
        let answer = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("failed to read confirmation from the terminal")?;
        tracing::info!(task = %task.kind, action, answer, "operator answered confirmation");
        Ok(answer)
    }
}

/// Approves everything without prompting (`--force`).
pub struct ForcedGate;

impl ConfirmationGate for ForcedGate {
    fn approve(&self, action: &str, task: &DiscoveryTask) -> Result<bool> {
        tracing::info!(task = %task.kind, state = %task.state, action, "auto-approved (force)");
        Ok(true)
    }
}

/// Used when there is no terminal to ask on and `--force` was not given.
pub struct UnattendedGate;

impl ConfirmationGate for UnattendedGate {
    fn approve(&self, action: &str, task: &DiscoveryTask) -> Result<bool> {
        tracing::warn!(task = %task.kind, state = %task.state, action, "no terminal to confirm on");
        anyhow::bail!("not running on a terminal; pass --force to {action} without asking")
    }
}

/// Pick the gate for the whole run.
#[must_use]
pub fn gate_for(force: bool, attended: bool) -> Box<dyn ConfirmationGate> {
    if force {
        Box::new(ForcedGate)
    } else if attended {
        Box::new(InteractiveGate)
    } else {
        Box::new(UnattendedGate)
    }
}

/// Whether an operator can answer a prompt: stdin and stderr both a terminal.
#[must_use]
pub fn attended() -> bool {
    use std::io::IsTerminal;
    std::io::stdin().is_terminal() && console::Term::stderr().is_term()
}
