// Weighing Ledger - Core Library
// Livestock weighings, per-animal weight deltas, summaries and reports.
// Exposes all modules for use in the CLI, the TUI and tests.

pub mod collation;
pub mod config;
pub mod deltas;
pub mod entry;
pub mod format;
pub mod import;
pub mod latest;
pub mod ledger;
pub mod ordering;
pub mod record;
pub mod report;
pub mod store;
pub mod views;

// Re-export commonly used types
pub use collation::{collate, compare_identifiers, CollationKey};
pub use config::{Config, ConfigError, StorageBackend};
pub use deltas::with_deltas;
pub use entry::{parse_number, EntryError, WeighingEntry};
pub use format::{format_delta, format_weight, DeltaTrend};
pub use import::{load_csv, read_csv};
pub use latest::latest_per_animal;
pub use ledger::{ImportSummary, WeighingLedger};
pub use ordering::sort_records;
pub use record::{AnnotatedRecord, Weighing, WeighingRecord};
pub use report::{ReportError, ReportFormat, ReportOptions, ReportScope, ReportTable};
pub use store::{JsonFileStore, MemoryStore, SqliteStore, WeighingStore};
pub use views::{history, summary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
