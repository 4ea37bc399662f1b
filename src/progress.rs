//! Progress store: durable, append-only record of resolved channel IDs.
//!
//! One identifier per line. The file is read once at startup to rebuild the
//! completed set, then appended to as items resolve. Every append is flushed
//! and synced before `record` returns, so a crash never loses a line that was
//! reported as recorded. Duplicate lines are harmless since only membership
//! matters.

use crate::error::{Error, Result};
use crate::model::ChannelId;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Sink for newly resolved identifiers.
///
/// The engine owns one of these for the duration of a run.
pub trait ProgressLog {
    /// Durably record `id` as resolved.
    fn record(&mut self, id: &ChannelId) -> Result<()>;
}

impl<P: ProgressLog + ?Sized> ProgressLog for &mut P {
    fn record(&mut self, id: &ChannelId) -> Result<()> {
        (**self).record(id)
    }
}

/// In-memory log, handy when durability is not needed (dry runs, tests).
impl ProgressLog for Vec<ChannelId> {
    fn record(&mut self, id: &ChannelId) -> Result<()> {
        self.push(id.clone());
        Ok(())
    }
}

/// Location of the progress file.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuild the set of resolved identifiers.
    ///
    /// A missing file means nothing has been resolved yet.
    pub fn load(&self) -> Result<HashSet<ChannelId>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => {
                return Err(Error::StorageUnavailable {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(content.lines().filter_map(ChannelId::parse).collect())
    }

    /// Open the file for appending, creating it if needed.
    pub fn open_log(&self) -> Result<ProgressFile> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| Error::StorageUnavailable {
                path: self.path.clone(),
                source,
            })?;
        Ok(ProgressFile {
            path: self.path.clone(),
            file,
        })
    }
}

/// Open append handle on the progress file. Closed when dropped.
#[derive(Debug)]
pub struct ProgressFile {
    path: PathBuf,
    file: File,
}

impl ProgressLog for ProgressFile {
    fn record(&mut self, id: &ChannelId) -> Result<()> {
        // Single write per line.
        let line = format!("{id}\n");
        append_synced(&mut self.file, line.as_bytes()).map_err(|source| {
            Error::StorageUnavailable {
                path: self.path.clone(),
                source,
            }
        })
    }
}

fn append_synced(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_data()
}
