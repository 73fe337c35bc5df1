//! Inventory networks and the pure part of discovery network selection.
//!
//! Pure functions only: no I/O, no async.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::domain::config::ScanSettings;

/// Extensible attribute flagging a network for discovery.
pub const DISCOVERY_ATTRIBUTE: &str = "Network_Discovery";

/// Literal value the inventory stores for an enabled flag. Compared exactly.
pub const DISCOVERY_FLAG: &str = "True";

/// Opaque appliance reference of a network object (`network/...:cidr/view`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct NetworkRef(pub String);

impl NetworkRef {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// View named by the trailing `/<view>` segment of the reference.
    #[must_use]
    pub fn view_suffix(&self) -> Option<&str> {
        self.0
            .rsplit_once('/')
            .map(|(_, view)| view)
            .filter(|view| !view.is_empty())
    }
}

impl fmt::Display for NetworkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of one inventory network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub reference: NetworkRef,
    pub cidr: String,
    pub view: String,
    pub extattrs: BTreeMap<String, String>,
}

impl Network {
    /// `true` when `Network_Discovery` is exactly `True`.
    #[must_use]
    pub fn is_discovery_eligible(&self) -> bool {
        self.extattrs
            .get(DISCOVERY_ATTRIBUTE)
            .is_some_and(|value| value == DISCOVERY_FLAG)
    }

    /// Identity used for de-duplication.
    #[must_use]
    pub fn identity(&self) -> (&str, &str) {
        (self.cidr.as_str(), self.view.as_str())
    }
}

/// Inventory query filter. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkFilter {
    /// Extensible attribute name and required value.
    pub attribute: Option<(String, String)>,
    pub view: Option<String>,
    pub cidr: Option<String>,
}

impl NetworkFilter {
    /// Every network carrying the discovery flag, in any view.
    #[must_use]
    pub fn discovery_enabled() -> Self {
        Self {
            attribute: Some((DISCOVERY_ATTRIBUTE.to_string(), DISCOVERY_FLAG.to_string())),
            ..Self::default()
        }
    }

    /// A single network by CIDR within a view.
    #[must_use]
    pub fn exact(cidr: &str, view: &str) -> Self {
        Self {
            attribute: None,
            view: Some(view.to_string()),
            cidr: Some(cidr.to_string()),
        }
    }
}

/// Payload written by the "update assigned networks" call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NetworkAssignment {
    pub mode: String,
    pub network_view: String,
    pub networks: Vec<NetworkRef>,
    pub ping_retries: u32,
    pub ping_timeout: u32,
}

impl NetworkAssignment {
    #[must_use]
    pub fn new(networks: Vec<NetworkRef>, view: &str, scan: &ScanSettings) -> Self {
        Self {
            mode: scan.mode.clone(),
            network_view: view.to_string(),
            networks,
            ping_retries: scan.ping_retries,
            ping_timeout: scan.ping_timeout_ms,
        }
    }
}

/// Keep eligible networks in `view`, first occurrence wins, input order kept.
#[must_use]
pub fn eligible_in_view<'a>(networks: &'a [Network], view: &str) -> Vec<&'a Network> {
    let mut seen = HashSet::new();
    networks
        .iter()
        .filter(|net| net.is_discovery_eligible() && net.view == view)
        .filter(|net| seen.insert(net.identity()))
        .collect()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
