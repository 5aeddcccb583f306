//! Event sink adapters.
//!
//! - `InMemoryEventStore`: append-only vector, default for tests and for
//!   deployments without a durable store.
//! - `JsonLinesEventStore`: append-only file, one `{kind, detail, timestamp}`
//!   document per line.

use crate::ports::EventSink;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{DetectionEvent, DetectionKind, PersistenceError};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Events kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<DetectionEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded events in arrival order.
    pub fn events(&self) -> Vec<DetectionEvent> {
        self.events.read().clone()
    }

    pub fn count_of(&self, kind: DetectionKind) -> usize {
        self.events.read().iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventSink for InMemoryEventStore {
    async fn record(&self, event: DetectionEvent) -> Result<(), PersistenceError> {
        self.events.write().push(event);
        Ok(())
    }
}

/// Append-only JSON-lines file.
#[derive(Debug)]
pub struct JsonLinesEventStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesEventStore {
    /// Open `path` for appending, creating it if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventSink for JsonLinesEventStore {
    async fn record(&self, event: DetectionEvent) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
