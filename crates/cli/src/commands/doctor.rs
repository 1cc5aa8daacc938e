//! Doctor command - validate configuration and show status

use anyhow::Result;
use opensesame_adapters::history::JsonFileTagHistory;
use opensesame_domain::{Engine, TagHistory};
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    digest: CheckResult,
    policy: CheckResult,
    history: CheckResult,
    clipboard: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        digest: check_digest(),
        policy: CheckResult::error("Not checked"),
        history: CheckResult::error("Not checked"),
        clipboard: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok(format!(
                "Configuration loaded (encoding: {})",
                c.derivation.encoding.as_str()
            ));
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.policy = check_policy(config);
        report.history = check_history(config).await;
        report.clipboard = check_clipboard(config);
    }

    let checks = [
        &report.config,
        &report.digest,
        &report.policy,
        &report.history,
        &report.clipboard,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_digest() -> CheckResult {
    match Engine::self_test() {
        Ok(()) => CheckResult::ok("SHA-1 self-test passed"),
        Err(e) => CheckResult::error(e.to_string()),
    }
}

fn check_policy(config: &AppConfig) -> CheckResult {
    let flags = config.policy.flags();
    if flags.is_empty() {
        return CheckResult::error(
            "No character class enabled by default; every generate call must pass -l/-u/-n/-s",
        );
    }

    let classes: Vec<_> = flags.enabled_classes().map(|c| c.name()).collect();
    CheckResult::ok(format!("Default classes: {}", classes.join(", ")))
}

async fn check_history(config: &AppConfig) -> CheckResult {
    if !config.general.remember_tags {
        return CheckResult::ok("Tag history disabled");
    }

    let history = JsonFileTagHistory::new(&config.general.history_path);
    match history.list().await {
        Ok(tags) => CheckResult::ok(format!(
            "{} remembered tags in {}",
            tags.len(),
            config.general.history_path.display()
        )),
        Err(e) => CheckResult::error(format!("Failed to read tag history: {}", e)),
    }
}

fn check_clipboard(config: &AppConfig) -> CheckResult {
    let command = &config.clipboard.command;
    if command.trim().is_empty() {
        return CheckResult::warn("No clipboard command configured; --copy is unavailable");
    }

    if command_exists(command) {
        CheckResult::ok(format!(
            "Clipboard command: {}, clears after {}s",
            command, config.clipboard.clear_after_secs
        ))
    } else {
        CheckResult::warn(format!("Clipboard command not found on PATH: {}", command))
    }
}

fn command_exists(command: &str) -> bool {
    let path = std::path::Path::new(command);
    if path.components().count() > 1 {
        return path.is_file();
    }

    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&paths).any(|dir| dir.join(command).is_file())
}

fn print_report(report: &DoctorReport) {
    println!("opensesame Doctor Report");
    println!("========================");
    println!();

    print_check("Config", &report.config);
    print_check("Digest", &report.digest);
    print_check("Default Policy", &report.policy);
    print_check("Tag History", &report.history);
    print_check("Clipboard", &report.clipboard);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
