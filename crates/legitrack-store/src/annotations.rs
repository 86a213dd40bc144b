//! Tracked bills and bill notes on disk.

use std::path::{Path, PathBuf};

use legitrack_core::{BillNotes, TrackedBills};
use tracing::info;

use crate::StoreError;
use crate::fsutil::{read_json, write_json};

/// `tracked_bills.json`: a JSON array of bill numbers.
#[derive(Debug, Clone)]
pub struct TrackedFile {
    path: PathBuf,
}

impl TrackedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<TrackedBills, StoreError> {
        let tracked: TrackedBills = read_json(&self.path)?.unwrap_or_default();
        info!(count = tracked.len(), "loaded tracked bills");
        Ok(tracked)
    }

    pub fn save(&self, tracked: &TrackedBills) -> Result<(), StoreError> {
        write_json(&self.path, tracked)?;
        info!(count = tracked.len(), "saved tracked bills");
        Ok(())
    }
}

/// `bill_notes.json`: bill number → note.
#[derive(Debug, Clone)]
pub struct NotesFile {
    path: PathBuf,
}

impl NotesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<BillNotes, StoreError> {
        let notes: BillNotes = read_json(&self.path)?.unwrap_or_default();
        info!(count = notes.len(), "loaded bill notes");
        Ok(notes)
    }

    pub fn save(&self, notes: &BillNotes) -> Result<(), StoreError> {
        write_json(&self.path, notes)?;
        info!(count = notes.len(), "saved bill notes");
        Ok(())
    }
}

/// Copy `source` into `uploads_dir` as `{bill_number}_{file name}`.
///
/// Returns the stored path, for recording in [`BillNote::files`](legitrack_core::BillNote).
pub fn store_upload(
    uploads_dir: &Path,
    bill_number: &str,
    source: &Path,
) -> Result<PathBuf, StoreError> {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::fs::create_dir_all(uploads_dir).map_err(|e| StoreError::io(uploads_dir, e))?;
    let dest = uploads_dir.join(format!("{bill_number}_{name}"));
    std::fs::copy(source, &dest).map_err(|e| StoreError::io(source, e))?;
    info!(bill = bill_number, path = %dest.display(), "stored upload");
    Ok(dest)
}
