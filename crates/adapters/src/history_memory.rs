//! In-memory tag history for testing and offline mode

use async_trait::async_trait;
use opensesame_domain::{Clock, HistoryError, SystemClock, TagHistory, TagRecord};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// In-memory tag history implementation
pub struct InMemoryTagHistory {
    tags: RwLock<BTreeMap<String, TagRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTagHistory {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tags: RwLock::new(BTreeMap::new()),
            clock,
        }
    }
}

impl Default for InMemoryTagHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagHistory for InMemoryTagHistory {
    async fn list(&self) -> Result<Vec<TagRecord>, HistoryError> {
        let tags = self
            .tags
            .read()
            .map_err(|e| HistoryError::Storage(e.to_string()))?;
        Ok(tags.values().cloned().collect())
    }

    async fn record(&self, tag: &str) -> Result<bool, HistoryError> {
        let mut tags = self
            .tags
            .write()
            .map_err(|e| HistoryError::Storage(e.to_string()))?;
        if tags.contains_key(tag) {
            return Ok(false);
        }
        tags.insert(
            tag.to_string(),
            TagRecord {
                tag: tag.to_string(),
                first_used: self.clock.now(),
            },
        );
        Ok(true)
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        let mut tags = self
            .tags
            .write()
            .map_err(|e| HistoryError::Storage(e.to_string()))?;
        tags.clear();
        Ok(())
    }
}
