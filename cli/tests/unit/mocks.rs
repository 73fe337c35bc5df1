//! Shared mock infrastructure for unit tests.
//!
//! [`ScriptedAppliance`] replays a fixed sequence of task states and records
//! every mutating call so tests can assert on ordering.

#![allow(clippy::expect_used, dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use anyhow::Result;
use discoveryctl_cli::application::ports::{
    Clock, ConfirmationGate, DiscoveryTaskApi, NetworkInventory, ProgressReporter,
};
use discoveryctl_cli::domain::network::DISCOVERY_ATTRIBUTE;
use discoveryctl_cli::domain::{
    ControlCommand, DiscoveryTask, Network, NetworkAssignment, NetworkFilter, NetworkRef,
    TaskKind, TaskRef, TaskState,
};

// ── Builders ──────────────────────────────────────────────────────────────────

pub fn net(cidr: &str, view: &str, eligible: bool) -> Network {
    let mut extattrs = BTreeMap::new();
    if eligible {
        extattrs.insert(DISCOVERY_ATTRIBUTE.to_string(), "True".to_string());
    }
    Network {
        reference: NetworkRef(format!("network/mock:{cidr}/{view}")),
        cidr: cidr.to_string(),
        view: view.to_string(),
        extattrs,
    }
}

// ── Appliance ─────────────────────────────────────────────────────────────────

/// Mutating call as seen by the appliance, with the state it was in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    End,
    Start,
    SetNetworks { state: TaskState, count: usize },
}

pub struct ScriptedAppliance {
    script: RefCell<VecDeque<TaskState>>,
    last: RefCell<TaskState>,
    inventory: Vec<Network>,
    reads: Cell<usize>,
    events: RefCell<Vec<Event>>,
    reject_update: bool,
}

impl ScriptedAppliance {
    /// Reads return `states` in order, then repeat the last one. After START
    /// every read returns RUNNING.
    pub fn new(states: &[TaskState]) -> Self {
        Self {
            script: RefCell::new(states.iter().cloned().collect()),
            last: RefCell::new(TaskState::Stopped),
            inventory: Vec::new(),
            reads: Cell::new(0),
            events: RefCell::new(Vec::new()),
            reject_update: false,
        }
    }

    pub fn with_inventory(mut self, inventory: Vec<Network>) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn rejecting_updates(mut self) -> Self {
        self.reject_update = true;
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn is_untouched(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl DiscoveryTaskApi for ScriptedAppliance {
    async fn get_task(&self, kind: TaskKind) -> Result<DiscoveryTask> {
        self.reads.set(self.reads.get() + 1);
        if let Some(next) = self.script.borrow_mut().pop_front() {
            *self.last.borrow_mut() = next;
        }
        Ok(DiscoveryTask {
            kind,
            reference: TaskRef(format!("discoverytask/mock:{}", kind.oid())),
            state: self.last.borrow().clone(),
            status: None,
            networks: Vec::new(),
            network_view: None,
        })
    }

    async fn set_networks(&self, _: &TaskRef, assignment: &NetworkAssignment) -> Result<()> {
        self.events.borrow_mut().push(Event::SetNetworks {
            state: self.last.borrow().clone(),
            count: assignment.networks.len(),
        });
        if self.reject_update {
            anyhow::bail!("HTTP 400: networks must belong to the task's view");
        }
        Ok(())
    }

    async fn send_control(&self, _: &TaskRef, command: ControlCommand) -> Result<()> {
        self.events.borrow_mut().push(match command {
            ControlCommand::End => Event::End,
            ControlCommand::Start => Event::Start,
        });
        if command == ControlCommand::Start {
            *self.script.borrow_mut() = VecDeque::from([TaskState::Running]);
        }
        Ok(())
    }
}

impl NetworkInventory for ScriptedAppliance {
    async fn list_networks(&self, filter: &NetworkFilter) -> Result<Vec<Network>> {
        Ok(self
            .inventory
            .iter()
            .filter(|n| match &filter.attribute {
                Some((key, value)) => n.extattrs.get(key) == Some(value),
                None => true,
            })
            .filter(|n| filter.view.as_ref().is_none_or(|v| &n.view == v))
            .filter(|n| filter.cidr.as_ref().is_none_or(|c| &n.cidr == c))
            .cloned()
            .collect())
    }
}

// ── Clock, gate, reporter ─────────────────────────────────────────────────────

/// Advances only when slept on.
pub struct StepClock {
    start: Instant,
    elapsed: Cell<Duration>,
}

impl StepClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }
}

pub struct Answer(pub bool);

impl ConfirmationGate for Answer {
    fn approve(&self, _: &str, _: &DiscoveryTask) -> anyhow::Result<bool> {
        Ok(self.0)
    }
}

/// Keeps every reported line for assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub lines: RefCell<Vec<String>>,
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.lines.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.lines.borrow_mut().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.lines.borrow_mut().push(format!("warn: {message}"));
    }
}
