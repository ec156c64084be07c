//! Clap derive structures for the `edgenet` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// edgenet -- poll D-Link routers and forward their device inventory
#[derive(Debug, Parser)]
#[command(
    name = "edgenet",
    version,
    about = "Poll D-Link routers for connected devices",
    long_about = "Logs in to D-Link DIR-series routers, merges the wireless client \
        and DHCP lease tables into one record per device, and forwards the \
        result to a telemetry endpoint.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "EDGENET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EDGENET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Log Enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll every configured router until interrupted
    Run(RunArgs),

    /// Run a single poll cycle and print the report
    #[command(name = "poll-once")]
    PollOnce(RunArgs),

    /// Show the merged device inventory of one router
    #[command(alias = "dev")]
    Devices(TenantArgs),

    /// List configured targets
    Targets,

    /// Add a device to a router's MAC filter
    Block(BlockArgs),

    /// Show or change WAN bandwidth limits
    Qos(QosArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Log batches instead of sending them to the telemetry endpoint
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct TenantArgs {
    /// Tenant identifier of the target router
    #[arg(long, short = 't')]
    pub tenant: String,
}

#[derive(Debug, Args)]
pub struct BlockArgs {
    #[command(flatten)]
    pub target: TenantArgs,

    /// Device MAC address (aa:bb:cc:dd:ee:ff)
    #[arg(long, short = 'm')]
    pub mac: String,

    /// Hostname to store with the filter entry
    #[arg(long)]
    pub hostname: Option<String>,
}

#[derive(Debug, Args)]
pub struct QosArgs {
    #[command(subcommand)]
    pub command: QosCommand,
}

#[derive(Debug, Subcommand)]
pub enum QosCommand {
    /// Print the current bandwidth table
    Show(TenantArgs),

    /// Set the limits of one port
    Set(QosSetArgs),
}

#[derive(Debug, Args)]
pub struct QosSetArgs {
    #[command(flatten)]
    pub target: TenantArgs,

    /// Port name as the router reports it (WAN, LAN1, ...)
    #[arg(long)]
    pub port: String,

    /// Total bandwidth in kbit/s (-1 for unlimited)
    #[arg(long, allow_negative_numbers = true)]
    pub max: i64,

    /// Ingress limit in kbit/s (-1 for unlimited)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub ingress: i64,

    /// Egress limit in kbit/s (-1 for unlimited)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub egress: i64,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
