//! Clap derive structures for the `georef` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// georef -- browse country → state → city reference data
#[derive(Debug, Parser)]
#[command(
    name = "georef",
    version,
    about = "Browse hierarchical geographic reference data from the command line",
    long_about = "Resolve countries, states and cities from a reference-data service.\n\n\
        Lookups share one in-memory cache and collapse concurrent requests,\n\
        the same way form widgets use the resolver library.",
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
    /// Reference service base URL (overrides config)
    #[arg(long, short = 'u', env = "GEOREF_URL", global = true)]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "GEOREF_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GEOREF_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

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
    /// Plain text, one key per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List countries
    #[command(alias = "c")]
    Countries,

    /// List the states of a country
    #[command(alias = "s")]
    States(StatesArgs),

    /// List the cities of a state
    Cities(CitiesArgs),

    /// Drive an address section level by level and show each level's options
    Walk(PathArgs),

    /// Fill a "current" section, copy it into a "permanent" one, report fetches
    Copy(PathArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Lookup args ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatesArgs {
    /// Country key (e.g., IN)
    pub country: String,
}

#[derive(Debug, Args)]
pub struct CitiesArgs {
    /// Country key (e.g., IN)
    pub country: String,

    /// State key within the country (e.g., MH)
    pub state: String,
}

/// A selection path, root first.
#[derive(Debug, Args)]
pub struct PathArgs {
    /// Country key
    pub country: String,

    /// State key
    pub state: Option<String>,

    /// City key
    #[arg(requires = "state")]
    pub city: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with the given service URL
    Init {
        /// Reference service base URL
        #[arg(long)]
        service_url: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
