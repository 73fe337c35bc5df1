//! discoveryctl: Infoblox network discovery task controller

use discoveryctl_cli::cli::Cli;

#[tokio::main]
async fn main() {
    // Errors are already printed by `Cli::run`.
    if Cli::parse_args().run().await.is_err() {
        std::process::exit(1);
    }
}
