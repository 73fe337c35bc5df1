//! `discoveryctl current`: stop, reconfigure and restart the current
//! discovery for one network view.

use anyhow::Result;
use clap::Args;
use tracing::Instrument as _;

use crate::app::AppContext;
use crate::application::ports::{Appliance, Clock, ConfirmationGate, Session};
use crate::application::services::network_selector::select_networks;
use crate::application::services::task_lifecycle::Controller;
use crate::commands::{release, report_abort};
use crate::domain::{ConfigError, DiscoveryConfig, DiscoveryError, NetworkAssignment, RunConfig, TaskKind};
use crate::infra::clock::TokioClock;
use crate::infra::wapi::WapiClient;
use crate::output::{OutputContext, TerminalReporter};

/// Arguments for `discoveryctl current`.
#[derive(Args)]
pub struct CurrentArgs {
    /// Network view to discover (short form: -nv)
    #[arg(long = "network_view", value_name = "VIEW")]
    pub network_view: String,

    /// Stop a running discovery without asking
    #[arg(short, long)]
    pub force: bool,
}

/// Run the current flow.
///
/// A declined stop is reported and returns `Ok`.
///
/// # Errors
///
/// Returns an error if configuration, selection or any lifecycle step fails.
pub async fn run(app: &AppContext, args: &CurrentArgs) -> Result<()> {
    let loaded = app.load_config();
    let gate = app.gate();
    flow(app, loaded, &args.network_view, gate.as_ref())
        .instrument(tracing::info_span!("CURRENT_DISCOVERY"))
        .await
}

async fn flow(
    app: &AppContext,
    loaded: Result<DiscoveryConfig, ConfigError>,
    view: &str,
    gate: &dyn ConfirmationGate,
) -> Result<()> {
    let cfg = app.resolve(loaded, Some(view))?;
    tracing::info!(view = %cfg.target_view, force = cfg.force, "current discovery run started");
    let client = WapiClient::connect(&cfg)?;
    let ctx = &app.output;
    match drive(&client, ctx, &cfg, &TokioClock, gate).await {
        Ok(()) => {
            tracing::info!("current discovery run finished");
            Ok(())
        }
        Err(e) if report_abort(ctx, &e) => {
            tracing::info!("current discovery run aborted by operator");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "current discovery run failed");
            Err(e.into())
        }
    }
}

/// Restart the current discovery over `session`, then close it.
async fn drive(
    session: &impl Session,
    ctx: &OutputContext,
    cfg: &RunConfig,
    clock: &impl Clock,
    gate: &dyn ConfirmationGate,
) -> Result<(), DiscoveryError> {
    let result = restart(session, ctx, cfg, clock, gate).await;
    release(session, result).await
}

async fn restart(
    client: &impl Appliance,
    ctx: &OutputContext,
    cfg: &RunConfig,
    clock: &impl Clock,
    gate: &dyn ConfirmationGate,
) -> Result<(), DiscoveryError> {
    let reporter = TerminalReporter::new(ctx);
    ctx.header(&format!("Current discovery, view '{}'", cfg.target_view));

    let fallback = cfg.fallback_cidr();
    let selection =
        select_networks(client, &reporter, &cfg.target_view, fallback.as_deref()).await?;
    let assignment = NetworkAssignment::new(selection.into_refs(), &cfg.target_view, &cfg.scan);

    let controller = Controller {
        api: client,
        clock,
        gate,
        reporter: &reporter,
        poll: cfg.poll,
    };
    let outcome = controller
        .reconfigure_and_restart(TaskKind::Current, &assignment)
        .await?;
    tracing::info!(
        state = %outcome.final_state,
        networks = outcome.networks.len(),
        stopped_first = outcome.stopped_first,
        "current discovery restarted"
    );
    ctx.kv("Networks:", &outcome.networks.len().to_string());
    ctx.kv("State:   ", &ctx.styled_state(&outcome.final_state));
    Ok(())
}
