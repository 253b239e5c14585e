use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use super::store::{validate_collection_name, SnapshotRecord, SnapshotStore};
use super::SnapshotError;

const SNAPSHOT_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Snapshot store keeping one `<collection>.json` file per collection in a
/// data directory.
///
/// Writes go to a uniquely named temporary file in the same directory,
/// are flushed to disk, and then renamed over the canonical file. A crash
/// at any point leaves either the old or the new snapshot in place; stray
/// temporary files are never read.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
    read_only: bool,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            read_only: false,
        }
    }

    /// Treat the medium as unwritable regardless of filesystem permissions.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical location of a collection's snapshot.
    pub fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", collection, SNAPSHOT_EXTENSION))
    }

    fn temp_path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.{}.{}.{}",
            collection,
            SNAPSHOT_EXTENSION,
            Uuid::now_v7().simple(),
            TEMP_EXTENSION
        ))
    }

    fn write_atomically(&self, collection: &str, data: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let temp_path = self.temp_path_for(collection);
        let result = write_and_sync(&temp_path, data)
            .and_then(|()| fs::rename(&temp_path, self.path_for(collection)));

        if result.is_err() {
            if let Err(err) = fs::remove_file(&temp_path) {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(
                        path = %temp_path.display(),
                        error = %err,
                        "failed to remove temporary snapshot"
                    );
                }
            }
            return result;
        }

        sync_dir(&self.dir);
        Ok(())
    }
}

fn write_and_sync(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// Persist the rename itself. Best effort: not every platform lets a
/// directory be opened for syncing.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, collection: &str) -> Result<Option<SnapshotRecord>, SnapshotError> {
        validate_collection_name(collection)?;
        match fs::read(self.path_for(collection)) {
            Ok(data) => Ok(Some(SnapshotRecord::new(collection, data))),
            // A data directory that cannot exist holds no snapshot either.
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(SnapshotError::Io {
                collection: collection.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn store(&self, record: &SnapshotRecord) -> Result<(), SnapshotError> {
        validate_collection_name(&record.collection)?;
        if self.read_only {
            return Err(SnapshotError::WriteFailure {
                collection: record.collection.clone(),
                reason: "store configured read-only".into(),
            });
        }

        self.write_atomically(&record.collection, &record.data)
            .map_err(|err| SnapshotError::WriteFailure {
                collection: record.collection.clone(),
                reason: err.to_string(),
            })?;

        debug!(
            collection = %record.collection,
            bytes = record.data.len(),
            "snapshot written"
        );
        Ok(())
    }
}
