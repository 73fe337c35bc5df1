//! `discoveryctl scheduled`: point the scheduled discovery at the flagged
//! networks without stopping or starting it.

use anyhow::Result;
use tracing::Instrument as _;

use crate::app::AppContext;
use crate::application::ports::{Appliance, Session};
use crate::application::services::network_selector::select_networks;
use crate::application::services::task_lifecycle::schedule_update;
use crate::application::services::task_reader::read_task;
use crate::commands::release;
use crate::domain::{ConfigError, DiscoveryConfig, DiscoveryError, NetworkAssignment, RunConfig, TaskKind};
use crate::infra::wapi::WapiClient;
use crate::output::{OutputContext, TerminalReporter};

/// Run the scheduled flow.
///
/// # Errors
///
/// Returns an error if configuration, selection or the network update fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let loaded = app.load_config();
    flow(app, loaded)
        .instrument(tracing::info_span!("SCHEDULED_DISCOVERY"))
        .await
}

async fn flow(app: &AppContext, loaded: Result<DiscoveryConfig, ConfigError>) -> Result<()> {
    let cfg = app.resolve(loaded, None)?;
    tracing::info!(view = %cfg.target_view, "scheduled discovery run started");
    let client = WapiClient::connect(&cfg)?;
    let result = drive(&client, &app.output, &cfg).await;
    match &result {
        Ok(()) => tracing::info!("scheduled discovery run finished"),
        Err(e) => tracing::error!(error = %e, "scheduled discovery run failed"),
    }
    Ok(result?)
}

/// Update the scheduled discovery over `session`, then close it.
async fn drive(
    session: &impl Session,
    ctx: &OutputContext,
    cfg: &RunConfig,
) -> Result<(), DiscoveryError> {
    let result = update(session, ctx, cfg).await;
    release(session, result).await
}

async fn update(
    client: &impl Appliance,
    ctx: &OutputContext,
    cfg: &RunConfig,
) -> Result<(), DiscoveryError> {
    let reporter = TerminalReporter::new(ctx);
    ctx.header("Scheduled discovery");

    let task = read_task(client, TaskKind::Scheduled).await?;
    let fallback = cfg.fallback_cidr();
    let selection =
        select_networks(client, &reporter, &cfg.target_view, fallback.as_deref()).await?;
    let assignment = NetworkAssignment::new(selection.into_refs(), &cfg.target_view, &cfg.scan);
    schedule_update(client, &reporter, &task, &assignment).await?;

    // The update already succeeded; the follow-up read is informational.
    match read_task(client, TaskKind::Scheduled).await {
        Ok(task) => ctx.task(&task),
        Err(e) => ctx.warn(&format!("networks updated, but {e}")),
    }
    Ok(())
}
