pub mod annotation;
pub mod bill;
pub mod cache;
pub mod config;
pub mod filter;
pub mod flatten;
pub mod jurisdiction;
pub mod schema;
pub mod source;

pub use annotation::{BillNote, BillNotes, Position, Priority, TrackedBills};
pub use bill::BillRecord;
pub use cache::{CacheEntry, ChangeCache};
pub use config::{Config, ConfigError, DataPaths};
pub use filter::{Annotations, RowFilter};
pub use flatten::{FlatRow, flatten};
pub use jurisdiction::{Jurisdiction, Level, expand_tokens};
pub use schema::export;
pub use source::{BillSource, RELEVANCE_THRESHOLD, SearchHit};
