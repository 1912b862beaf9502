// 🗄️ Storage - flat list of weighings, saved as a whole
//
// Two backends share one contract: `load` returns the snapshot in insertion
// order, `save` replaces it. Insertion order matters: it is the tie-break for
// weighings of one animal with identical timestamps.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::record::WeighingRecord;

/// Fixed key the record list is stored under
pub const DEFAULT_STORAGE_KEY: &str = "anncor_weighings_v1";

pub trait WeighingStore {
    fn load(&self) -> Result<Vec<WeighingRecord>>;
    fn save(&mut self, records: &[WeighingRecord]) -> Result<()>;
}

impl<S: WeighingStore + ?Sized> WeighingStore for Box<S> {
    fn load(&self) -> Result<Vec<WeighingRecord>> {
        (**self).load()
    }

    fn save(&mut self, records: &[WeighingRecord]) -> Result<()> {
        (**self).save(records)
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// Nothing leaves the process. Used by tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Vec<WeighingRecord>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<WeighingRecord>) -> Self {
        MemoryStore { records, saves: 0 }
    }

    /// How many times `save` was called
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl WeighingStore for MemoryStore {
    fn load(&self) -> Result<Vec<WeighingRecord>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[WeighingRecord]) -> Result<()> {
        self.records = records.to_vec();
        self.saves += 1;
        Ok(())
    }
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

/// `<data_dir>/<storage_key>.json`, a JSON array of records
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path, storage_key: &str) -> Self {
        Self::new(data_dir.join(format!("{}.json", storage_key)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WeighingStore for JsonFileStore {
    fn load(&self) -> Result<Vec<WeighingRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no store file yet");
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        Ok(parse_record_list(&raw))
    }

    fn save(&mut self, records: &[WeighingRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(records)?;

        // Write beside the target, then rename over it
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), count = records.len(), "store saved");
        Ok(())
    }
}

/// Parse a stored list, sanitizing as it goes. A document that is not a
/// JSON array loads as empty; elements that cannot become a record are
/// skipped.
pub fn parse_record_list(raw: &str) -> Vec<WeighingRecord> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(error = %e, "store is not a JSON array; starting empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable stored record");
                None
            }
        })
        .collect()
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// SQLite-backed store (WAL journal). One row per weighing.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn in_dir(data_dir: &Path, storage_key: &str) -> Result<Self> {
        Self::open(&data_dir.join(format!("{}.db", storage_key)))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM weighings", [], |row| row.get(0))?;
        Ok(count)
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS weighings (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            idempotency_hash TEXT NOT NULL,
            date_iso TEXT NOT NULL,
            animal_id TEXT NOT NULL,
            weight_kg REAL NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_weighings_animal ON weighings(animal_id, date_iso)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_weighings_hash ON weighings(idempotency_hash)",
        [],
    )?;

    Ok(())
}

impl WeighingStore for SqliteStore {
    fn load(&self) -> Result<Vec<WeighingRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date_iso, animal_id, weight_kg
             FROM weighings
             ORDER BY seq ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, date_iso, animal_id, weight_kg) in rows {
            match DateTime::parse_from_rfc3339(&date_iso) {
                Ok(date) => records.push(WeighingRecord::with_id(
                    id,
                    date.with_timezone(&Utc),
                    animal_id,
                    weight_kg.unwrap_or(0.0),
                )),
                Err(e) => warn!(%id, %date_iso, error = %e, "skipping row with unreadable date"),
            }
        }

        Ok(records)
    }

    fn save(&mut self, records: &[WeighingRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM weighings", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO weighings (id, idempotency_hash, date_iso, animal_id, weight_kg)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                insert.execute(params![
                    record.id,
                    record.idempotency_hash(),
                    record.date_iso(),
                    record.animal_id,
                    record.weight_kg,
                ])?;
            }
        }

        tx.commit().context("Failed to commit weighings")?;
        info!(count = records.len(), "weighings saved to sqlite");
        Ok(())
    }
}
