//! Network Selector: which networks a discovery task should scan.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{NetworkInventory, ProgressReporter};
use crate::domain::network::eligible_in_view;
use crate::domain::{DiscoveryError, NetworkFilter, NetworkRef};

/// How the selection was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Networks flagged for discovery in the target view.
    Flagged(Vec<NetworkRef>),
    /// Nothing was flagged; the configured fallback network is used instead.
    Fallback(NetworkRef),
}

impl Selection {
    /// The references to assign, in order.
    #[must_use]
    pub fn into_refs(self) -> Vec<NetworkRef> {
        match self {
            Self::Flagged(refs) => refs,
            Self::Fallback(reference) => vec![reference],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flagged(refs) => refs.len(),
            Self::Fallback(_) => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Select the networks flagged `Network_Discovery=True` in `view`.
///
/// When none match and `fallback_cidr` is set, the fallback network is looked
/// up in the same view and used alone.
///
/// # Errors
///
/// - [`DiscoveryError::InventoryRead`] if an inventory query fails.
/// - [`DiscoveryError::NoEligibleNetworks`] if nothing matched and there is no fallback.
/// - [`DiscoveryError::FallbackNotFound`] if the fallback is not in the view.
pub async fn select_networks(
    inventory: &impl NetworkInventory,
    reporter: &impl ProgressReporter,
    view: &str,
    fallback_cidr: Option<&str>,
) -> Result<Selection, DiscoveryError> {
    let flagged = list(inventory, &NetworkFilter::discovery_enabled()).await?;
    let in_view: Vec<NetworkRef> = eligible_in_view(&flagged, view)
        .into_iter()
        .map(|net| net.reference.clone())
        .collect();

    tracing::info!(
        flagged = flagged.len(),
        in_view = in_view.len(),
        view,
        "selected networks flagged for discovery"
    );

    if !in_view.is_empty() {
        reporter.step(&format!(
            "{} network(s) flagged for discovery in view '{view}'",
            in_view.len()
        ));
        return Ok(Selection::Flagged(in_view));
    }

    let Some(cidr) = fallback_cidr else {
        tracing::warn!(view, "no eligible networks and no fallback configured");
        return Err(DiscoveryError::NoEligibleNetworks {
            view: view.to_string(),
        });
    };

    let matches = list(inventory, &NetworkFilter::exact(cidr, view)).await?;
    match matches.into_iter().find(|net| net.view == view) {
        Some(net) => {
            tracing::info!(view, cidr, reference = %net.reference, "using fallback network");
            reporter.warn(&format!(
                "no networks flagged in view '{view}', using fallback network {cidr}"
            ));
            Ok(Selection::Fallback(net.reference))
        }
        None => {
            tracing::error!(view, cidr, "fallback network not found");
            Err(DiscoveryError::FallbackNotFound {
                cidr: cidr.to_string(),
                view: view.to_string(),
            })
        }
    }
}

async fn list(
    inventory: &impl NetworkInventory,
    filter: &NetworkFilter,
) -> Result<Vec<crate::domain::Network>, DiscoveryError> {
    inventory.list_networks(filter).await.map_err(|e| {
        tracing::error!(?filter, error = %format!("{e:#}"), "inventory query failed");
        DiscoveryError::InventoryRead {
            reason: format!("{e:#}"),
        }
    })
}
