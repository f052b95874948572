// This is the infra layer - it implements the traits defined in core.
// This file provides an IN-MEMORY implementation of ModerationLogStore.
//
// Useful for tests and keyless local runs; it follows the same contract
// as the SQLite store without touching disk. The log is an ordered list,
// so a Vec behind an async RwLock fits better than a keyed map here.

use crate::core::moderation::{ModerationError, ModerationLogEntry, ModerationLogStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

pub struct InMemoryModerationLogStore {
    entries: RwLock<Vec<ModerationLogEntry>>,
}

impl InMemoryModerationLogStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryModerationLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModerationLogStore for InMemoryModerationLogStore {
    async fn record_decision(&self, entry: ModerationLogEntry) -> Result<(), ModerationError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn recent_decisions(
        &self,
        limit: u32,
    ) -> Result<Vec<ModerationLogEntry>, ModerationError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit as usize).cloned().collect())
    }
}
