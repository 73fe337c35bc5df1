//! `discoveryctl status`: read-only view of the discovery tasks.

use anyhow::Result;
use clap::Args;
use tracing::Instrument as _;

use crate::app::AppContext;
use crate::application::ports::{DiscoveryTaskApi, Session};
use crate::application::services::task_reader::read_task;
use crate::commands::release;
use crate::domain::{ConfigError, DiscoveryConfig, DiscoveryError, TaskKind};
use crate::infra::wapi::WapiClient;
use crate::output::{OutputContext, progress};

/// Arguments for `discoveryctl status`.
#[derive(Args)]
pub struct StatusArgs {
    /// Task to show [default: both]
    #[arg(value_enum)]
    pub kind: Option<TaskKind>,
}

/// Print the state of one or both discovery tasks.
///
/// # Errors
///
/// Returns an error if configuration is invalid or a task cannot be read.
pub async fn run(app: &AppContext, args: &StatusArgs) -> Result<()> {
    let loaded = app.load_config();
    let kinds = match args.kind {
        Some(kind) => vec![kind],
        None => vec![TaskKind::Scheduled, TaskKind::Current],
    };

    flow(app, loaded, &kinds)
        .instrument(tracing::info_span!("DISCOVERY_STATUS"))
        .await
}

async fn flow(
    app: &AppContext,
    loaded: Result<DiscoveryConfig, ConfigError>,
    kinds: &[TaskKind],
) -> Result<()> {
    // The view is irrelevant here; only the connection settings must be valid.
    let view = loaded
        .as_ref()
        .ok()
        .and_then(|cfg| cfg.network_view.clone())
        .unwrap_or_else(|| "default".to_string());
    let cfg = app.resolve(loaded, Some(&view))?;
    let client = WapiClient::connect(&cfg)?;
    Ok(drive(&client, &app.output, kinds).await?)
}

/// Show `kinds` over `session`, then close it.
async fn drive(
    session: &impl Session,
    ctx: &OutputContext,
    kinds: &[TaskKind],
) -> Result<(), DiscoveryError> {
    let result = show(session, ctx, kinds).await;
    release(session, result).await
}

async fn show(
    client: &impl DiscoveryTaskApi,
    ctx: &OutputContext,
    kinds: &[TaskKind],
) -> Result<(), DiscoveryError> {
    for &kind in kinds {
        let pb = if ctx.show_progress() {
            progress::spinner(&format!("Reading {kind} discovery..."))
        } else {
            progress::hidden()
        };
        let task = read_task(client, kind).await;
        pb.finish_and_clear();
        ctx.task(&task?);
    }
    Ok(())
}
