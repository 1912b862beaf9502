// 📒 Weighing Ledger - owns the record set
//
// The only place records are added or removed. Every change is saved
// through the injected store before the call returns; views are recomputed
// from the in-memory snapshot on every read.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::config::{Config, StorageBackend};
use crate::entry::WeighingEntry;
use crate::record::{AnnotatedRecord, WeighingRecord};
use crate::report::{ReportOptions, ReportScope, ReportTable};
use crate::store::{JsonFileStore, SqliteStore, WeighingStore};
use crate::views;

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

pub struct WeighingLedger<S: WeighingStore = Box<dyn WeighingStore>> {
    store: S,
    records: Vec<WeighingRecord>,
}

impl WeighingLedger<Box<dyn WeighingStore>> {
    /// Open the store the configuration points at
    pub fn from_config(config: &Config) -> Result<Self> {
        let data_dir = config.data_dir();
        let key = &config.storage.storage_key;

        let store: Box<dyn WeighingStore> = match config.storage.backend {
            StorageBackend::Json => Box::new(JsonFileStore::in_dir(&data_dir, key)),
            StorageBackend::Sqlite => Box::new(
                SqliteStore::in_dir(&data_dir, key)
                    .context("Failed to open SQLite weighing store")?,
            ),
        };

        info!(
            backend = ?config.storage.backend,
            data_dir = %data_dir.display(),
            "opening weighing ledger"
        );
        Self::open(store)
    }
}

impl<S: WeighingStore> WeighingLedger<S> {
    pub fn open(store: S) -> Result<Self> {
        let records = store.load().context("Failed to load weighings")?;
        info!(count = records.len(), "weighings loaded");
        Ok(WeighingLedger { store, records })
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Validate and append a new weighing
    pub fn add(&mut self, entry: &WeighingEntry) -> Result<WeighingRecord> {
        let record = entry.validate()?;

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next)?;

        info!(
            id = %record.id,
            animal = %record.animal_id,
            weight_kg = record.weight_kg,
            "weighing added"
        );
        Ok(record)
    }

    /// Remove the record with `id`. Unknown ids are a no-op (`false`).
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let next: Vec<WeighingRecord> =
            self.records.iter().filter(|r| r.id != id).cloned().collect();

        if next.len() == self.records.len() {
            warn!(%id, "delete requested for unknown weighing");
            return Ok(false);
        }

        self.commit(next)?;
        info!(%id, "weighing deleted");
        Ok(true)
    }

    /// Remove every record; returns how many were removed
    pub fn clear_all(&mut self) -> Result<usize> {
        let removed = self.records.len();
        self.commit(Vec::new())?;

        info!(removed, "all weighings cleared");
        Ok(removed)
    }

    /// Append records whose values are not already present. Duplicates
    /// within the batch itself are skipped too. One save for the batch.
    pub fn import(&mut self, incoming: Vec<WeighingRecord>) -> Result<ImportSummary> {
        let mut seen: HashSet<String> = self.records.iter().map(|r| r.idempotency_hash()).collect();
        let mut next = self.records.clone();
        let mut summary = ImportSummary::default();

        for record in incoming {
            if seen.insert(record.idempotency_hash()) {
                next.push(record);
                summary.inserted += 1;
            } else {
                summary.duplicates += 1;
            }
        }

        if summary.inserted > 0 {
            self.commit(next)?;
        }

        info!(
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            "import finished"
        );
        Ok(summary)
    }

    /// Save `next`, then make it the current snapshot. On a failed save the
    /// in-memory set is left untouched.
    fn commit(&mut self, next: Vec<WeighingRecord>) -> Result<()> {
        self.store.save(&next).context("Failed to save weighings")?;
        self.records = next;
        Ok(())
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Snapshot in insertion order
    pub fn records(&self) -> &[WeighingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WeighingRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn animal_ids(&self) -> Vec<String> {
        views::animal_ids(&self.records)
    }

    pub fn history(&self, filter: Option<&str>) -> Vec<AnnotatedRecord> {
        views::history(&self.records, filter)
    }

    pub fn summary(&self) -> Vec<AnnotatedRecord> {
        views::summary(&self.records)
    }

    /// Report for every animal (`None`) or one animal
    pub fn report(&self, filter: Option<&str>, options: &ReportOptions) -> Result<ReportTable> {
        let scope = ReportScope::from_filter(filter);
        let source = self.history(scope.filter());
        let table = ReportTable::build(&scope, &source, options, Utc::now())?;
        Ok(table)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
