//! In-memory listing store with JSON file persistence.
//!
//! The store is the sole source of truth for structured attributes within a
//! session. The vector index is a derived view over the same `id` space and
//! is rebuilt from here, never the other way around.

use crate::error::{Error, Result};
use crate::types::{ListingId, ListingRecord, ParseBatch};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct ListingStore {
    records: BTreeMap<ListingId, ListingRecord>,
}

impl ListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the persisted listing file. A missing or malformed file is
    /// reported and treated as "no prior listings", not a startup failure.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                info!(path = %path.display(), "no persisted listings, starting empty");
                return Self::new();
            }
        };
        match serde_json::from_str::<Vec<ListingRecord>>(&raw) {
            Ok(records) => {
                let mut store = Self::new();
                for record in records {
                    // Last one wins on a corrupt duplicate id; ids written by
                    // `save` are unique.
                    store.records.insert(record.id, record);
                }
                info!(count = store.records.len(), path = %path.display(), "loaded listings");
                store
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed listing file ignored");
                Self::new()
            }
        }
    }

    /// Write the full record set, ascending by id.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let records: Vec<&ListingRecord> = self.records.values().collect();
        fs::write(path, serde_json::to_string_pretty(&records)?)?;
        Ok(())
    }

    /// Append a parse batch. Does not deduplicate by content; an id
    /// collision means the batch was numbered against a different store
    /// state and is refused outright.
    pub fn add_batch(&mut self, batch: &ParseBatch) -> Result<usize> {
        for record in &batch.records {
            if self.records.contains_key(&record.id) {
                return Err(Error::Operation(format!(
                    "id {} already present, batch refused",
                    record.id
                )));
            }
        }
        for record in &batch.records {
            self.records.insert(record.id, record.clone());
        }
        Ok(batch.records.len())
    }

    /// All records, ascending by id.
    pub fn all(&self) -> Vec<&ListingRecord> {
        self.records.values().collect()
    }

    pub fn get(&self, id: ListingId) -> Result<&ListingRecord> {
        self.records.get(&id).ok_or(Error::NotFound(id))
    }

    pub fn remove(&mut self, id: ListingId) -> Result<ListingRecord> {
        self.records.remove(&id).ok_or(Error::NotFound(id))
    }

    /// Next free id: current maximum + 1, or 0 for an empty store.
    /// Parse batches numbered from here never collide on repeated runs.
    pub fn next_id(&self) -> ListingId {
        self.records.keys().next_back().map_or(0, |max| max + 1)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
