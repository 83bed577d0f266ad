//! Command-line interface for `hdms`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use hdms_core::model::Role;
use hdms_core::util::parse_timestamp;
use hdms_core::Snapshot;

use crate::config::{self, AppConfig, CliOverrides};
use crate::fetch;
use crate::logging;

/// `hdms` - Helpdesk moderator dashboard.
#[derive(Parser, Debug)]
#[command(name = "hdms")]
#[command(
    author,
    version,
    about = "Helpdesk moderator dashboard, SLA alerts and session guard",
    long_about = None,
    after_help = "Tickets come from --source (a JSON snapshot file or an http(s) feed URL)."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Extra config file, applied over user and workspace config
    #[arg(long, global = true, env = "HDMS_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ticket source: snapshot file path or http(s) feed URL
    #[arg(long, global = true, value_name = "PATH|URL")]
    pub source: Option<String>,

    /// Snapshot file used when the source is unavailable
    #[arg(long, global = true, value_name = "PATH")]
    pub fallback: Option<PathBuf>,

    /// Auth token for the feed and the route gate
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Evaluate as of this instant instead of the current time
    #[arg(long, global = true, value_name = "TIMESTAMP", value_parser = parse_now)]
    pub now: Option<DateTime<Utc>>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

fn parse_now(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("'{raw}' is not an RFC 3339 timestamp or date"))
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Full moderator dashboard
    Dashboard,

    /// Tickets breaching or close to breaching their SLA
    Sla(ListArgs),

    /// Tickets requiring a moderator's attention
    Attention(ListArgs),

    /// Active tickets per department
    Workload,

    /// Recent ticket activity
    Activity(ListArgs),

    /// Decide whether a request path may proceed
    Gate(GateArgs),

    /// Run the inactivity guard, reading activity from stdin
    Session(SessionArgs),

    /// Show configuration
    Config(ConfigCommand),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Maximum number of entries (overrides the configured limit)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct GateArgs {
    /// Request path, e.g. /moderator/dashboard
    pub path: String,

    /// Value of the user_role cookie
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Route the session is on
    #[arg(long, default_value = "/moderator/dashboard")]
    pub route: String,

    /// Role to log in as
    #[arg(long, default_value = "moderator")]
    pub role: Role,

    /// Inactivity limit in seconds (overrides config)
    #[arg(long)]
    pub limit_secs: Option<u64>,

    /// Check interval in milliseconds (overrides config)
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Print the JSON schema of the config file
    Schema,

    /// List config file locations
    Path,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Print only the version number
    #[arg(long)]
    pub short: bool,
}

/// Shared state for commands that read tickets.
#[derive(Debug, Clone)]
pub struct DeskContext {
    pub config: AppConfig,
    pub json: bool,
    pub now: DateTime<Utc>,
}

impl DeskContext {
    /// Load tickets from the configured source, falling back as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be constructed.
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        fetch::load(&self.config)
    }
}

/// Provenance line shown above text reports.
#[must_use]
pub fn source_line(snapshot: &Snapshot) -> String {
    let count = snapshot.tickets.len();
    let noun = if count == 1 { "ticket" } else { "tickets" };
    format!("Source: {} ({count} {noun})", snapshot.origin)
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            source: self.source.clone(),
            fallback: self.fallback.clone(),
            token: self.token.clone(),
        }
    }
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.json)?;

    if let Commands::Version(args) = &cli.command {
        return commands::version::execute(args, cli.json);
    }

    let overrides = cli.overrides();
    let app_config = config::load_config(&overrides)?;
    let ctx = DeskContext {
        config: app_config,
        json: cli.json,
        now: cli.now.unwrap_or_else(Utc::now),
    };
    tracing::debug!(command = cli.command.name(), now = %ctx.now, "Dispatching command");

    match &cli.command {
        Commands::Dashboard => commands::dashboard::execute(&ctx),
        Commands::Sla(args) => commands::sla::execute(args, &ctx),
        Commands::Attention(args) => commands::attention::execute(args, &ctx),
        Commands::Workload => commands::workload::execute(&ctx),
        Commands::Activity(args) => commands::activity::execute(args, &ctx),
        Commands::Gate(args) => commands::gate::execute(args, &ctx),
        Commands::Session(args) => commands::session::execute(args, &ctx),
        Commands::Config(config) => commands::config::execute(&config.command, &overrides, &ctx),
        Commands::Version(_) => Err(anyhow!("version is handled before config loading")),
    }
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Sla(_) => "sla",
            Self::Attention(_) => "attention",
            Self::Workload => "workload",
            Self::Activity(_) => "activity",
            Self::Gate(_) => "gate",
            Self::Session(_) => "session",
            Self::Config(config) => match config.command {
                ConfigSubcommand::Show => "config show",
                ConfigSubcommand::Schema => "config schema",
                ConfigSubcommand::Path => "config path",
            },
            Self::Version(_) => "version",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hdms",
            "sla",
            "--limit",
            "3",
            "--json",
            "--now",
            "2024-06-01T12:00:00Z",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.now.unwrap().to_rfc3339(), "2024-06-01T12:00:00+00:00");
        match cli.command {
            Commands::Sla(args) => assert_eq!(args.limit, Some(3)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_now_rejected() {
        assert!(Cli::try_parse_from(["hdms", "dashboard", "--now", "yesterday"]).is_err());
    }

    #[test]
    fn test_session_role_parses() {
        let cli = Cli::try_parse_from(["hdms", "session", "--role", "Assignee"]).unwrap();
        match cli.command {
            Commands::Session(args) => {
                assert_eq!(args.role, Role::Assignee);
                assert_eq!(args.route, "/moderator/dashboard");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_source_line() {
        let snapshot = Snapshot {
            tickets: Vec::new(),
            origin: hdms_core::SnapshotOrigin::Live,
        };
        assert_eq!(source_line(&snapshot), "Source: live (0 tickets)");
    }
}
