//! History command - list and clear remembered tags

use anyhow::{Context, Result};
use opensesame_adapters::history::JsonFileTagHistory;
use opensesame_domain::TagHistory;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;

use crate::args::{HistoryArgs, HistoryCommands};
use crate::config::AppConfig;

pub async fn execute(args: HistoryArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let history = JsonFileTagHistory::new(&config.general.history_path);

    match args.command {
        HistoryCommands::List { json } => list_tags(&history, json).await,
        HistoryCommands::Clear => clear_tags(&history).await,
    }
}

async fn list_tags(history: &JsonFileTagHistory, json: bool) -> Result<()> {
    let tags = history.list().await.context("Failed to read tag history")?;

    if json {
        let output = serde_json::json!({
            "count": tags.len(),
            "tags": tags,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if tags.is_empty() {
        println!("No remembered tags.");
        return Ok(());
    }

    println!("Remembered Tags ({} found)", tags.len());
    println!("========================");
    for record in &tags {
        let first_used = record
            .first_used
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        println!("{}  (first used {})", record.tag, first_used);
    }

    Ok(())
}

async fn clear_tags(history: &JsonFileTagHistory) -> Result<()> {
    history
        .clear()
        .await
        .context("Failed to clear tag history")?;

    println!("Cleared tag history: {}", history.path().display());
    Ok(())
}
