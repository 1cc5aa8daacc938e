//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use opensesame_domain::TextEncoding;
use std::path::PathBuf;

/// opensesame: derive reproducible passwords from a tag and a passphrase
#[derive(Parser, Debug)]
#[command(name = "opensesame")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive the password for a tag
    Generate(GenerateArgs),

    /// Manage remembered tags
    History(HistoryArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Site or account label
    #[arg(short, long)]
    pub tag: String,

    /// Include lowercase letters
    #[arg(short = 'l', long)]
    pub lowercase: bool,

    /// Include uppercase letters
    #[arg(short = 'u', long)]
    pub uppercase: bool,

    /// Include digits
    #[arg(short = 'n', long)]
    pub numbers: bool,

    /// Include symbols
    #[arg(short = 's', long)]
    pub symbols: bool,

    /// Environment variable holding the passphrase (stdin is read if unset)
    #[arg(long, default_value = "OPENSESAME_PASSPHRASE")]
    pub passphrase_env: String,

    /// Override the configured text encoding (latin1, utf8)
    #[arg(long)]
    pub encoding: Option<TextEncoding>,

    /// Copy to the clipboard and clear it later instead of printing
    #[arg(long, conflicts_with = "json")]
    pub copy: bool,

    /// Do not remember the tag
    #[arg(long)]
    pub no_history: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    /// True if any class flag was given on the command line
    pub fn has_class_flags(&self) -> bool {
        self.lowercase || self.uppercase || self.numbers || self.symbols
    }
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List remembered tags
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget all remembered tags
    Clear,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./opensesame.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (file plus environment overrides)
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
