//! Clap derive structures for the `zapcast` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zapcast -- CLI for WhatsApp campaign gateways
#[derive(Debug, Parser)]
#[command(
    name = "zapcast",
    version,
    about = "Manage WhatsApp campaign gateways from the command line",
    long_about = "Drive a multi-account WhatsApp campaign gateway: pair\n\
        devices via QR codes, switch the dispatch account, and send\n\
        bulk campaigns with optional media attachments.",
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
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "ZAPCAST_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway URL (overrides profile)
    #[arg(long, short = 'g', env = "ZAPCAST_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Bearer token for the gateway API
    #[arg(long, env = "ZAPCAST_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZAPCAST_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ZAPCAST_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ZAPCAST_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
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
    /// Manage gateway accounts and device pairing
    #[command(alias = "acc", alias = "a")]
    Accounts(AccountsArgs),

    /// Send bulk message campaigns
    #[command(alias = "camp", alias = "c")]
    Campaigns(CampaignsArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Accounts ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AccountsArgs {
    #[command(subcommand)]
    pub command: AccountsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// List accounts and their connection status
    #[command(alias = "ls")]
    List,

    /// Select the account campaigns are dispatched through
    Switch {
        /// Phone number of the target account
        phone_number: String,
    },

    /// Pair a new account by printing a QR code payload
    Pair(PairArgs),
}

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Keep watching: print re-issued codes until the device pairs
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Give up watching after this many seconds
    #[arg(long, default_value = "300")]
    pub watch_timeout: u64,
}

// ── Campaigns ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CampaignsArgs {
    #[command(subcommand)]
    pub command: CampaignsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CampaignsCommand {
    /// Dispatch a campaign through the selected account
    Send(SendArgs),
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Campaign name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Message body
    #[arg(long, short = 'm')]
    pub message: String,

    /// Recipient phone number (repeatable)
    #[arg(long = "to", value_name = "PHONE")]
    pub recipients: Vec<String>,

    /// File with one recipient phone number per line
    #[arg(long, value_name = "PATH", conflicts_with = "recipients")]
    pub to_file: Option<PathBuf>,

    /// Media attachment to send with the message
    #[arg(long, value_name = "PATH")]
    pub media: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Interactively create a gateway profile
    Init,

    /// Store a bearer token for a profile
    SetToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
