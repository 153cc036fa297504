//! Snapshot sinks
//!
//! A committed graph is written through a [`SnapshotSink`] before it becomes
//! visible to readers. The directory sink writes `graph.json` via a temporary
//! file and a rename, so a crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// File name of the snapshot inside the storage directory
pub const SNAPSHOT_FILE: &str = "graph.json";

/// Destination for encoded graph snapshots
pub trait SnapshotSink: Send + Sync {
    /// Human-readable location, used in error messages
    fn location(&self) -> PathBuf;

    /// Replace the stored snapshot with `bytes`
    fn write(&self, bytes: &[u8]) -> io::Result<()>;

    /// Flush anything buffered so the last written snapshot is durable
    fn flush(&self) -> io::Result<()>;
}

/// Writes snapshots into a storage directory
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl SnapshotSink for DirectorySink {
    fn location(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let tmp = self.dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.location())
    }

    fn flush(&self) -> io::Result<()> {
        let path = self.location();
        if path.exists() {
            fs::File::open(path)?.sync_all()?;
        }
        Ok(())
    }
}

/// Keeps the last snapshot in memory; for tests and throwaway stores
#[derive(Default)]
pub struct MemorySink {
    last: Mutex<Option<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently written snapshot, if any
    pub fn last_snapshot(&self) -> Option<Vec<u8>> {
        self.last.lock().clone()
    }
}

impl SnapshotSink for MemorySink {
    fn location(&self) -> PathBuf {
        PathBuf::from(":memory:")
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        *self.last.lock() = Some(bytes.to_vec());
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for std::sync::Arc<S> {
    fn location(&self) -> PathBuf {
        (**self).location()
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }

    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }
}
