//! Shared fakes for service unit tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::application::ports::{
    Clock, ConfirmationGate, DiscoveryTaskApi, NetworkInventory, ProgressReporter, Session,
};
use crate::domain::network::DISCOVERY_ATTRIBUTE;
use crate::domain::{
    ControlCommand, DiscoveryTask, Network, NetworkAssignment, NetworkFilter, NetworkRef,
    PollSettings, RunConfig, ScanSettings, TaskKind, TaskRef, TaskState,
};

/// Inventory network with the discovery flag set or unset.
pub fn network(cidr: &str, view: &str, eligible: bool) -> Network {
    let mut extattrs = BTreeMap::new();
    extattrs.insert(
        DISCOVERY_ATTRIBUTE.to_string(),
        if eligible { "True" } else { "False" }.to_string(),
    );
    Network {
        reference: NetworkRef(format!("network/fake:{cidr}/{view}")),
        cidr: cidr.to_string(),
        view: view.to_string(),
        extattrs,
    }
}

pub fn assignment(cidrs: &[&str]) -> NetworkAssignment {
    NetworkAssignment::new(
        cidrs
            .iter()
            .map(|c| NetworkRef(format!("network/fake:{c}/default")))
            .collect(),
        "default",
        &ScanSettings::default(),
    )
}

/// Resolved settings for a run against a fake appliance.
pub fn run_config(view: &str) -> RunConfig {
    RunConfig {
        endpoint: url::Url::parse("https://gm.example.test").expect("valid url"),
        wapi_version: "v2.12".to_string(),
        verify_tls: true,
        username: "admin".to_string(),
        password: "secret".to_string(),
        target_view: view.to_string(),
        fallback_network: None,
        force: false,
        poll: PollSettings::default(),
        scan: ScanSettings::default(),
        log_file: PathBuf::from("discovery.log"),
    }
}

/// A call that changed (or tried to change) the remote task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Control(ControlCommand),
    /// `observed` is the state returned by the most recent read.
    SetNetworks { observed: TaskState },
}

/// In-memory appliance. Reads pop `states` in order; the last one sticks.
/// START replaces the queue with the post-start state.
pub struct FakeAppliance {
    states: RefCell<VecDeque<TaskState>>,
    current: RefCell<TaskState>,
    networks: Vec<Network>,
    reads: Cell<u32>,
    failing_reads: Cell<u32>,
    inventory_down: Cell<bool>,
    updates_rejected: Cell<bool>,
    rejected_control: Cell<Option<ControlCommand>>,
    state_after_start: RefCell<TaskState>,
    mutations: RefCell<Vec<Call>>,
    closes: Cell<u32>,
    close_rejected: Cell<bool>,
}

impl FakeAppliance {
    pub fn with_states(states: &[TaskState]) -> Self {
        Self {
            states: RefCell::new(states.iter().cloned().collect()),
            current: RefCell::new(TaskState::Stopped),
            networks: Vec::new(),
            reads: Cell::new(0),
            failing_reads: Cell::new(0),
            inventory_down: Cell::new(false),
            updates_rejected: Cell::new(false),
            rejected_control: Cell::new(None),
            state_after_start: RefCell::new(TaskState::Running),
            mutations: RefCell::new(Vec::new()),
            closes: Cell::new(0),
            close_rejected: Cell::new(false),
        }
    }

    pub fn with_networks(networks: Vec<Network>) -> Self {
        Self {
            networks,
            ..Self::with_states(&[])
        }
    }

    /// Queue task states on top of an inventory-backed fake.
    #[must_use]
    pub fn then_states(self, states: &[TaskState]) -> Self {
        *self.states.borrow_mut() = states.iter().cloned().collect();
        self
    }

    pub fn fail_reads(&self, count: u32) {
        self.failing_reads.set(count);
    }

    pub fn fail_inventory(&self) {
        self.inventory_down.set(true);
    }

    pub fn fail_updates(&self) {
        self.updates_rejected.set(true);
    }

    pub fn fail_control(&self, command: ControlCommand) {
        self.rejected_control.set(Some(command));
    }

    pub fn fail_close(&self) {
        self.close_rejected.set(true);
    }

    /// How many times the session was released.
    pub fn closes(&self) -> u32 {
        self.closes.get()
    }

    pub fn after_start(&self, state: TaskState) {
        *self.state_after_start.borrow_mut() = state;
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.mutations.borrow().clone()
    }

    pub fn controls(&self) -> Vec<ControlCommand> {
        self.mutations
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Control(cmd) => Some(*cmd),
                Call::SetNetworks { .. } => None,
            })
            .collect()
    }

    pub fn updates(&self) -> usize {
        self.mutations
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::SetNetworks { .. }))
            .count()
    }

    /// Task snapshot without consuming a read.
    pub fn snapshot(&self, kind: TaskKind) -> DiscoveryTask {
        let state = self
            .states
            .borrow()
            .front()
            .cloned()
            .unwrap_or_else(|| self.current.borrow().clone());
        task(kind, state)
    }
}

fn task(kind: TaskKind, state: TaskState) -> DiscoveryTask {
    DiscoveryTask {
        kind,
        reference: TaskRef(format!("discoverytask/fake:{}", kind.oid())),
        state,
        status: None,
        networks: Vec::new(),
        network_view: Some("default".to_string()),
    }
}

impl DiscoveryTaskApi for FakeAppliance {
    async fn get_task(&self, kind: TaskKind) -> Result<DiscoveryTask> {
        self.reads.set(self.reads.get() + 1);
        if self.failing_reads.get() > 0 {
            self.failing_reads.set(self.failing_reads.get() - 1);
            anyhow::bail!("connection reset");
        }
        if let Some(next) = self.states.borrow_mut().pop_front() {
            *self.current.borrow_mut() = next;
        }
        Ok(task(kind, self.current.borrow().clone()))
    }

    async fn set_networks(&self, _: &TaskRef, _: &NetworkAssignment) -> Result<()> {
        let observed = self.current.borrow().clone();
        self.mutations
            .borrow_mut()
            .push(Call::SetNetworks { observed });
        if self.updates_rejected.get() {
            anyhow::bail!("HTTP 400: invalid network reference");
        }
        Ok(())
    }

    async fn send_control(&self, _: &TaskRef, command: ControlCommand) -> Result<()> {
        self.mutations.borrow_mut().push(Call::Control(command));
        if self.rejected_control.get() == Some(command) {
            anyhow::bail!("HTTP 400: {command} not allowed");
        }
        if command == ControlCommand::Start {
            let next = self.state_after_start.borrow().clone();
            *self.states.borrow_mut() = VecDeque::from([next]);
        }
        Ok(())
    }
}

impl Session for FakeAppliance {
    async fn close(&self) -> Result<()> {
        self.closes.set(self.closes.get() + 1);
        if self.close_rejected.get() {
            anyhow::bail!("logout rejected");
        }
        Ok(())
    }
}

impl NetworkInventory for FakeAppliance {
    async fn list_networks(&self, filter: &NetworkFilter) -> Result<Vec<Network>> {
        if self.inventory_down.get() {
            anyhow::bail!("HTTP 503");
        }
        Ok(self
            .networks
            .iter()
            .filter(|n| {
                filter
                    .attribute
                    .as_ref()
                    .is_none_or(|(k, v)| n.extattrs.get(k) == Some(v))
            })
            .filter(|n| filter.view.as_ref().is_none_or(|v| &n.view == v))
            .filter(|n| filter.cidr.as_ref().is_none_or(|c| &n.cidr == c))
            .cloned()
            .collect())
    }
}

/// Clock that only moves when slept on.
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.offset.set(self.offset.get() + duration);
    }
}

/// Gate with a fixed answer that counts how often it was asked.
pub struct FixedGate {
    answer: Option<bool>,
    asked: Cell<u32>,
}

impl FixedGate {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: Some(answer),
            asked: Cell::new(0),
        }
    }

    /// A gate that has nobody to ask.
    pub fn unavailable() -> Self {
        Self {
            answer: None,
            asked: Cell::new(0),
        }
    }

    pub fn asked(&self) -> u32 {
        self.asked.get()
    }
}

impl ConfirmationGate for FixedGate {
    fn approve(&self, _: &str, _: &DiscoveryTask) -> Result<bool> {
        self.asked.set(self.asked.get() + 1);
        self.answer
            .ok_or_else(|| anyhow::anyhow!("not a terminal"))
    }
}

pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}
