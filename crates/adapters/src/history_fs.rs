//! JSON file-backed tag history

use async_trait::async_trait;
use opensesame_domain::{Clock, HistoryError, SystemClock, TagHistory, TagRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    tags: Vec<TagRecord>,
}

/// Tag history persisted as a single JSON document
pub struct JsonFileTagHistory {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl JsonFileTagHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<HistoryFile, HistoryError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HistoryFile::default());
            }
            Err(error) => return Err(error.into()),
        };

        if content.trim().is_empty() {
            return Ok(HistoryFile::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            HistoryError::Serialization(format!("{}: {}", self.path.display(), e))
        })
    }

    async fn write(&self, file: &HistoryFile) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(file)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TagHistory for JsonFileTagHistory {
    async fn list(&self) -> Result<Vec<TagRecord>, HistoryError> {
        let _guard = self.lock.lock().await;
        let mut tags = self.read().await?.tags;
        tags.sort_by(|a, b| a.tag.cmp(&b.tag));
        Ok(tags)
    }

    async fn record(&self, tag: &str) -> Result<bool, HistoryError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await?;

        if file.tags.iter().any(|record| record.tag == tag) {
            return Ok(false);
        }

        file.tags.push(TagRecord {
            tag: tag.to_string(),
            first_used: self.clock.now(),
        });
        self.write(&file).await?;

        tracing::debug!(path = %self.path.display(), count = file.tags.len(), "Recorded tag");
        Ok(true)
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
