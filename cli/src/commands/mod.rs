//! Command handlers: one module per subcommand.
//!
//! Each handler starts the log sink, opens a span naming its flow, resolves
//! the configuration inside it, opens a WAPI session and always closes it.

pub mod current;
pub mod scheduled;
pub mod status;

use crate::application::ports::Session;
use crate::domain::DiscoveryError;
use crate::output::OutputContext;

/// Print the outcome of a declined stop. Returns `true` when `err` was one.
pub(crate) fn report_abort(ctx: &OutputContext, err: &DiscoveryError) -> bool {
    if err.is_clean_exit() {
        ctx.info(&err.to_string());
        true
    } else {
        false
    }
}

/// Close `session` and hand back `result` untouched. A failed logout is
/// logged and never replaces the outcome of the flow.
pub(crate) async fn release<T>(
    session: &impl Session,
    result: Result<T, DiscoveryError>,
) -> Result<T, DiscoveryError> {
    match session.close().await {
        Ok(()) => tracing::info!("WAPI session closed"),
        Err(e) => tracing::warn!(error = %format!("{e:#}"), "WAPI logout failed"),
    }
    result
}
