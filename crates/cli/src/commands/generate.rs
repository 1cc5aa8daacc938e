//! Generate command - derive a password for a tag

use anyhow::{Context, Result};
use opensesame_adapters::{clipboard::CommandClipboard, history::JsonFileTagHistory};
use opensesame_domain::usecases::{
    ClipboardDelivery, DeliveryEvent, DeliveryOutcome, GenerateConfig, GenerateRequest,
    GenerateUseCase,
};
use opensesame_domain::{Clipboard, Engine, InputError, Password, PolicyFlags};
use secrecy::SecretString;
use std::env::VarError;
use std::io::{self, BufRead};
use std::path::PathBuf;

use crate::args::GenerateArgs;
use crate::config::AppConfig;

pub async fn execute(args: GenerateArgs, config_path: Option<PathBuf>) -> Result<()> {
    // A silently defaulted config could switch the encoding and change the password.
    let config = AppConfig::load(config_path.as_deref())?;

    Engine::self_test().context("SHA-1 is unavailable")?;

    // Checked before the passphrase prompt so an interactive user is not asked for nothing.
    if args.tag.is_empty() {
        return Err(InputError::EmptyTag).context("Invalid input");
    }

    let flags = resolve_flags(&args, &config);
    let engine = Engine::new(args.encoding.unwrap_or(config.derivation.encoding));
    let passphrase = read_passphrase(&args.passphrase_env)?;

    let history = JsonFileTagHistory::new(&config.general.history_path);
    let generate_config = GenerateConfig {
        remember_tags: config.general.remember_tags && !args.no_history,
    };
    let usecase = GenerateUseCase::new(history, engine, generate_config);

    let outcome = usecase
        .execute(GenerateRequest {
            tag: args.tag.clone(),
            passphrase,
            flags,
        })
        .await
        .context("Invalid input")?;

    if args.copy {
        let clipboard = CommandClipboard::new(
            config.clipboard.command.clone(),
            config.clipboard.args.clone(),
            config.clipboard.timeout(),
        );
        return copy_to_clipboard(&clipboard, &config, &args.tag, &outcome.password).await;
    }

    if args.json {
        let output = serde_json::json!({
            "tag": args.tag,
            "policy": flags.usage_fingerprint(),
            "encoding": engine.encoding().as_str(),
            "password": outcome.password.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", outcome.password);
    }

    Ok(())
}

fn resolve_flags(args: &GenerateArgs, config: &AppConfig) -> PolicyFlags {
    if args.has_class_flags() {
        PolicyFlags::new(args.lowercase, args.uppercase, args.numbers, args.symbols)
    } else {
        config.policy.flags()
    }
}

/// Passphrase from the named environment variable, else the first stdin line
fn read_passphrase(env_var: &str) -> Result<SecretString> {
    match std::env::var(env_var) {
        Ok(value) => {
            tracing::debug!(env_var = %env_var, "Using passphrase from environment");
            return Ok(SecretString::from(value));
        }
        Err(VarError::NotUnicode(_)) => {
            anyhow::bail!("{} is set but is not valid UTF-8", env_var);
        }
        Err(VarError::NotPresent) => {}
    }

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read passphrase from stdin")?;

    let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
    Ok(SecretString::from(trimmed))
}

async fn copy_to_clipboard(
    clipboard: &dyn Clipboard,
    config: &AppConfig,
    tag: &str,
    password: &Password,
) -> Result<()> {
    let delivery = ClipboardDelivery::new(clipboard, config.clipboard.policy());

    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    tokio::pin!(shutdown);

    let notify = |event: DeliveryEvent| match event {
        DeliveryEvent::Copied => eprintln!("Copied password for '{}' to clipboard", tag),
        DeliveryEvent::ClearingSoon { remaining } => {
            eprintln!("Clearing clipboard in {} seconds", remaining.as_secs())
        }
        DeliveryEvent::Cleared => eprintln!("Cleared password"),
    };

    tokio::select! {
        result = delivery.deliver(password, notify) => {
            match result.context("Clipboard delivery failed")? {
                DeliveryOutcome::Kept => tracing::info!("Password left on clipboard"),
                DeliveryOutcome::Cleared => {}
            }
        }
        _ = &mut shutdown => {
            tracing::info!("Interrupted, clearing clipboard");
            clipboard.clear().await.context("Failed to clear clipboard")?;
            eprintln!("Cleared password");
        }
    }

    Ok(())
}
