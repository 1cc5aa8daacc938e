//! Configuration loading and management

use anyhow::{Context, Result};
use opensesame_domain::usecases::ClipboardPolicy;
use opensesame_domain::{PolicyFlags, TextEncoding};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "OPENSESAME";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub derivation: DerivationConfig,

    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    #[serde(default = "default_true")]
    pub remember_tags: bool,
}

/// Character classes used when none are given on the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_true")]
    pub lowercase: bool,

    #[serde(default = "default_true")]
    pub uppercase: bool,

    #[serde(default = "default_true")]
    pub numbers: bool,

    #[serde(default = "default_true")]
    pub symbols: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivationConfig {
    #[serde(default)]
    pub encoding: TextEncoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    #[serde(default = "default_clipboard_command")]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_clipboard_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_clear_after")]
    pub clear_after_secs: u64,

    #[serde(default = "default_warn_before")]
    pub warn_before_secs: u64,
}

// Default value functions
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_history_path() -> PathBuf {
    PathBuf::from("./opensesame-history.json")
}

fn default_true() -> bool {
    true
}

fn default_clipboard_command() -> String {
    if cfg!(target_os = "macos") {
        "pbcopy".to_string()
    } else {
        "wl-copy".to_string()
    }
}

fn default_clipboard_timeout() -> u64 {
    5
}

fn default_clear_after() -> u64 {
    120
}

fn default_warn_before() -> u64 {
    30
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            history_path: default_history_path(),
            remember_tags: default_true(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            uppercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            command: default_clipboard_command(),
            args: vec![],
            timeout_secs: default_clipboard_timeout(),
            clear_after_secs: default_clear_after(),
            warn_before_secs: default_warn_before(),
        }
    }
}

impl PolicyConfig {
    pub fn flags(&self) -> PolicyFlags {
        PolicyFlags::new(self.lowercase, self.uppercase, self.numbers, self.symbols)
    }
}

impl ClipboardConfig {
    pub fn policy(&self) -> ClipboardPolicy {
        ClipboardPolicy {
            clear_after: Duration::from_secs(self.clear_after_secs),
            warn_before: Duration::from_secs(self.warn_before_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./opensesame.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(Some(environment_overrides(std::env::vars_os()))),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# opensesame configuration

[general]
log_level = "warn"
history_path = "./opensesame-history.json"
# Remember tags for `opensesame history list`
remember_tags = true

# Classes used when no -l/-u/-n/-s flag is given
[policy]
lowercase = true
uppercase = true
numbers = true
symbols = true

[derivation]
# latin1 or utf8. Changing this changes every derived password.
encoding = "latin1"

[clipboard]
command = "wl-copy"  # wl-copy, pbcopy, xclip, ...
args = []
timeout_secs = 5
# 0 leaves the password on the clipboard
clear_after_secs = 120
warn_before_secs = 30
"#
        .to_string()
    }
}

/// `OPENSESAME__*` variables only. Anything else in the environment, such as
/// a non-UTF-8 passphrase variable, is never decoded here.
fn environment_overrides(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> config::Map<String, String> {
    let prefix = format!("{}{}", ENV_PREFIX, ENV_SEPARATOR);

    vars.into_iter()
        .filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            if !key.to_ascii_uppercase().starts_with(&prefix) {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((key, value)),
                Err(_) => {
                    tracing::warn!(key = %key, "Ignoring non-UTF-8 configuration variable");
                    None
                }
            }
        })
        .collect()
}
