// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/guardiao-rs

//! Durable store for the append-only sensor event log

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::event::{EventLog, SensorEvent};

/// Append-only event log backed by a single JSON array on disk.
///
/// One instance owns the backing file and serializes the read-append-write
/// sequence behind an internal mutex, so appends within the process never
/// interleave. Reads never fail: an absent or unparseable file reads as an
/// empty log.
pub struct EventStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl EventStore {
    /// Create a store over `path`. The file itself appears on the first
    /// append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event, preserving everything already stored.
    ///
    /// The rewritten array lands in a scratch file that is renamed over the
    /// log, so a torn write cannot lose previously stored events.
    pub fn append(&self, event: &SensorEvent) -> Result<()> {
        let _guard = self.lock.lock();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create data directory {}", parent.display()))?;
            }
        }

        let mut log = self.load_unlocked();
        log.push(event.clone());

        let body = serde_json::to_vec_pretty(&log).context("failed to encode event log")?;
        let scratch = self.path.with_extension("json.tmp");
        fs::write(&scratch, body)
            .with_context(|| format!("failed to write event log scratch {}", scratch.display()))?;
        fs::rename(&scratch, &self.path)
            .with_context(|| format!("failed to publish event log {}", self.path.display()))?;

        debug!("Event log now holds {} events ({})", log.len(), self.path.display());
        Ok(())
    }

    /// One consistent snapshot of the full log, in arrival order.
    pub fn read_all(&self) -> EventLog {
        let _guard = self.lock.lock();
        self.load_unlocked()
    }

    fn load_unlocked(&self) -> EventLog {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(log) => log,
            Err(e) => {
                warn!(
                    "Event log {} is not valid JSON ({}), starting over empty",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }
}
