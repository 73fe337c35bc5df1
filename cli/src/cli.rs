//! CLI argument parsing with clap derive

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Keep Infoblox network discovery tasks pointed at the right networks
///
/// Runs targeting the same task must not overlap: schedule them so that one
/// finishes before the next begins.
#[derive(Parser)]
#[command(
    name = "discoveryctl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file [default: config.yaml]
    #[arg(long, global = true, env = "DISCOVERY_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Point the scheduled discovery at the flagged networks
    Scheduled,

    /// Stop, reconfigure and restart the current discovery
    Current(commands::current::CurrentArgs),

    /// Show discovery task state
    Status(commands::status::StatusArgs),
}

impl Cli {
    /// Parse `std::env::args`, accepting the `-nv` short form of `--network_view`.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails. The error has already been
    /// printed to stderr.
    pub async fn run(self) -> Result<()> {
        let Cli {
            config,
            quiet,
            no_color,
            command,
        } = self;
        let force = matches!(&command, Command::Current(args) if args.force);
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags { force, config },
        });
        let result = match command {
            Command::Scheduled => commands::scheduled::run(&app).await,
            Command::Current(args) => commands::current::run(&app, &args).await,
            Command::Status(args) => commands::status::run(&app, &args).await,
        };
        if let Err(e) = &result {
            app.output.error(&format!("Error: {e}"));
        }
        result
    }
}

/// Rewrite the two-letter `-nv` flag, which clap cannot express as a short.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-nv" {
                OsString::from("--network_view")
            } else if let Some(value) = arg.to_str().and_then(|s| s.strip_prefix("-nv=")) {
                OsString::from(format!("--network_view={value}"))
            } else {
                arg
            }
        })
        .collect()
}
