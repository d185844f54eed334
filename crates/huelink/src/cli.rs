//! Clap derive structures for the `huelink` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// huelink -- pair with a Hue bridge and color every light at once
#[derive(Debug, Parser)]
#[command(
    name = "huelink",
    version,
    about = "Pair with a Hue bridge and set all of its lights to one color",
    long_about = "Pairs with a Philips Hue bridge through its link button, stores the\n\
        issued application key, and sends one color (CIE xy + brightness) to\n\
        every light the bridge knows about.",
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
    /// Bridge address or URL (overrides config)
    #[arg(long, short = 'b', global = true)]
    pub bridge: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, env = "HUELINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Credentials file (overrides config)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Accept the bridge's self-signed TLS certificate
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Trust only this PEM certificate for the bridge
    #[arg(long, global = true, conflicts_with = "insecure")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
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
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
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

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pair if needed, then set every light to one color
    Set(SetArgs),

    /// Pair with the bridge (press its link button when asked)
    Pair(PairArgs),

    /// List the lights the bridge reports
    #[command(alias = "ls")]
    Lights,

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Chromaticity x, chromaticity y (both 0-1) and brightness (0-100).
    /// Missing or invalid values fall back to the configured default color.
    #[arg(
        value_name = "X Y INTENSITY",
        num_args = 0..,
        allow_negative_numbers = true
    )]
    pub values: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Pair again even if credentials are already stored
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file (prompts for the bridge unless --bridge is given)
    Init,

    /// Display the resolved configuration
    Show,

    /// Print the config file location
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
