//! Storage layer: change cache, CSV exports, keywords, and annotation files.
//!
//! Every file is rewritten whole on save, via a temp file and rename.

mod error;
pub use error::StoreError;

pub mod annotations;
pub mod cache_file;
pub mod export;
pub mod fsutil;
pub mod keywords;

pub use annotations::{NotesFile, TrackedFile, store_upload};
pub use cache_file::CacheFile;
pub use export::{TrackerExport, merge_rows, write_tracked_export};
pub use keywords::KeywordsFile;
