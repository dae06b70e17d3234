//! Clap derive structures for the `panfly` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// panfly -- read-only CLI for firewall XML management APIs
#[derive(Debug, Parser)]
#[command(
    name = "panfly",
    version,
    about = "Inspect firewalls and their aggregator from the command line",
    long_about = "Queries a firewall's XML management API for system state, sessions,\n\
        policy, routing, VPN and logs. When pointed at an aggregator, calls can be\n\
        routed to a managed device with --target.",
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
    /// Profile to use
    #[arg(long, short = 'p', env = "PANFLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Management host or URL (overrides profile)
    #[arg(long, short = 'H', env = "PANFLY_HOST", global = true)]
    pub host: Option<String>,

    /// API key (prefer api_key_env in the profile)
    #[arg(long, global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Managed-device serial to route calls to (aggregators only)
    #[arg(long, short = 't', env = "PANFLY_TARGET", global = true)]
    pub target: Option<String>,

    /// Virtual system for policy lookups
    #[arg(long, env = "PANFLY_VSYS", global = true)]
    pub vsys: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PANFLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PANFLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PANFLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// System information, resources and inventory
    #[command(alias = "sys")]
    System(SystemArgs),

    /// Session table
    #[command(alias = "sess")]
    Sessions(SessionsArgs),

    /// Security and NAT rule bases with hit counts
    #[command(alias = "pol")]
    Policy(PolicyArgs),

    /// Interfaces, routes, VPN tunnels and ARP
    #[command(alias = "net")]
    Network(NetworkArgs),

    /// Traffic, threat and system log queries
    Logs(LogsArgs),

    /// Devices managed by an aggregator
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── System ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Debug, Subcommand)]
pub enum SystemCommand {
    /// Hostname, model, versions and uptime
    Info,
    /// CPU, load and memory usage
    Resources,
    /// Temperature, fan and power sensors
    #[command(alias = "env")]
    Environmentals,
    /// Installed licenses
    Licenses,
    /// Certificates in the configuration
    #[command(alias = "certs")]
    Certificates {
        /// Only show certificates expiring within this many days
        #[arg(long)]
        expiring_days: Option<i64>,
    },
    /// Recent jobs
    Jobs,
}

// ── Sessions ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List sessions, optionally filtered
    #[command(alias = "ls")]
    List {
        /// Filter expression: `key=value` pairs (e.g. "from=trust dport=443")
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },
    /// Session table counters
    Info,
}

// ── Policy ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// Security rules in evaluation order
    #[command(alias = "sec")]
    Security(RuleListArgs),
    /// NAT rules in evaluation order
    Nat(RuleListArgs),
}

#[derive(Debug, Args)]
pub struct RuleListArgs {
    /// Only show rules from this layer
    #[arg(long, short = 'l')]
    pub layer: Option<LayerArg>,

    /// Only show rules that have never been hit
    #[arg(long)]
    pub unused: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayerArg {
    Pre,
    Local,
    Post,
}

// ── Network ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub command: NetworkCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// Logical and hardware interfaces
    #[command(alias = "if")]
    Interfaces,
    /// Routing table
    Routes,
    /// IPsec tunnels
    Vpn,
    /// ARP table
    Arp,
}

// ── Logs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// Traffic logs
    Traffic(LogQueryArgs),
    /// Threat logs
    Threat(LogQueryArgs),
    /// System event logs
    System(LogQueryArgs),
}

#[derive(Debug, Args)]
pub struct LogQueryArgs {
    /// Appliance filter expression, e.g. "(addr.src in 10.0.0.5)"
    #[arg(long)]
    pub query: Option<String>,

    /// Maximum entries (0 or less for the default, capped at 5000)
    #[arg(long, short = 'n', default_value = "100", allow_negative_numbers = true)]
    pub max: i64,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List managed devices
    #[command(alias = "ls")]
    List {
        /// Only show connected devices
        #[arg(long)]
        connected: bool,
    },
    /// Default target stored in the active profile
    Target(TargetArgs),
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    #[command(subcommand)]
    pub command: TargetCommand,
}

#[derive(Debug, Subcommand)]
pub enum TargetCommand {
    /// Route the profile's calls to this serial by default
    Set {
        serial: String,
        /// Skip checking the serial against the managed-device list
        #[arg(long)]
        no_verify: bool,
    },
    /// Address the aggregator itself by default
    Clear,
    /// Show the profile's default target
    Show,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or replace a profile
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,
        /// Management host or URL
        #[arg(long)]
        address: String,
        /// Environment variable holding the API key
        #[arg(long)]
        api_key_env: Option<String>,
        /// Store the API key in plaintext
        #[arg(long)]
        store_api_key: Option<String>,
        /// Default managed-device serial
        #[arg(long = "default-target")]
        default_target: Option<String>,
        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },
    /// Print the configuration (secrets redacted)
    Show,
    /// Print the config file path
    Path,
    /// List profile names
    Profiles,
    /// Set the default profile
    Use { name: String },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
