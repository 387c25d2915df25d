//! Semantic index over listing records.
//!
//! The index maps `id` -> embedding entry and is a derived view: it never
//! owns structured fields and is recomputed from the store on rebuild.
//! Rebuilds construct into a fresh map and swap it in whole, so callers
//! never observe a half-rebuilt index and a failed embedding call leaves
//! the previous index untouched.

use listinglens_core::error::{Error, Result};
use listinglens_core::store::ListingStore;
use listinglens_core::traits::Embedder;
use listinglens_core::types::{ListingId, ListingRecord};
use std::collections::BTreeMap;
use tracing::info;

pub mod embed;

/// The exact text embedded for one record.
///
/// Fixed field order, each value prefixed with its field name, so that
/// structured attributes contribute to semantic relevance alongside the
/// narrative text and re-embedding is deterministic.
pub fn embedding_text(record: &ListingRecord) -> String {
    format!(
        "neighborhood: {}\nprice: {}\nbedrooms: {}\nbathrooms: {}\nsize: {} sqft\ndescription: {}\nneighborhood description: {}",
        record.neighborhood,
        record.price,
        record.bedrooms,
        record.bathrooms,
        record.size,
        record.description,
        record.neighborhood_description,
    )
}

#[derive(Debug, Clone)]
pub struct EmbeddingEntry {
    pub id: ListingId,
    pub text: String,
    pub vector: Vec<f32>,
}

pub struct EmbeddingIndexer {
    embedder: Box<dyn Embedder>,
    entries: BTreeMap<ListingId, EmbeddingEntry>,
}

impl EmbeddingIndexer {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder, entries: BTreeMap::new() }
    }

    /// Full rebuild from the store. All-or-nothing: every record is
    /// embedded into a staging map first and only then swapped in.
    pub fn build(&mut self, store: &ListingStore) -> Result<()> {
        let records = store.all();
        let texts: Vec<String> = records.iter().map(|r| embedding_text(r)).collect();
        let vectors = self.embedder.embed_batch(&texts).map_err(|e| {
            Error::Index(format!("embedding failed during build of {} records: {e}", texts.len()))
        })?;
        if vectors.len() != texts.len() {
            return Err(Error::Index(format!(
                "embedding failed: got {} vectors for {} records",
                vectors.len(),
                texts.len()
            )));
        }
        for vector in &vectors {
            self.check_dim(vector)?;
        }

        let mut fresh = BTreeMap::new();
        for ((record, text), vector) in records.iter().zip(texts).zip(vectors) {
            fresh.insert(
                record.id,
                EmbeddingEntry { id: record.id, text, vector: normalize(vector) },
            );
        }
        self.entries = fresh;
        info!(count = self.entries.len(), "index rebuilt");
        Ok(())
    }

    /// Insert or overwrite the entry for one record.
    pub fn upsert(&mut self, record: &ListingRecord) -> Result<()> {
        let text = embedding_text(record);
        let mut vectors = self
            .embedder
            .embed_batch(std::slice::from_ref(&text))
            .map_err(|e| Error::Index(format!("embedding failed for listing {}: {e}", record.id)))?;
        if vectors.len() != 1 {
            return Err(Error::Index(format!(
                "embedding failed: got {} vectors for one record",
                vectors.len()
            )));
        }
        self.check_dim(&vectors[0])?;
        let vector = normalize(vectors.remove(0));
        self.entries.insert(record.id, EmbeddingEntry { id: record.id, text, vector });
        Ok(())
    }

    /// Every vector in the index must have the dimensionality the
    /// embedder declares; a mismatch would silently skew cosine scores.
    fn check_dim(&self, vector: &[f32]) -> Result<()> {
        let dim = self.embedder.dim();
        if vector.len() != dim {
            return Err(Error::Index(format!(
                "embedding failed: got a {}-dim vector from a {dim}-dim embedder",
                vector.len()
            )));
        }
        Ok(())
    }

    /// Drop the entry for a removed record. Removing an unindexed id is a
    /// no-op, reported through the return value.
    pub fn remove(&mut self, id: ListingId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Nearest neighbors of `text`: at most `k` `(id, score)` pairs by
    /// descending cosine similarity, ties broken by ascending id.
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<(ListingId, f32)>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(vec![]);
        }
        let mut vectors = self
            .embedder
            .embed_batch(&[text.to_string()])
            .map_err(|e| Error::Index(format!("embedding failed for query: {e}")))?;
        if vectors.is_empty() {
            return Err(Error::Index("embedding failed: empty query response".to_string()));
        }
        self.check_dim(&vectors[0])?;
        let query_vec = normalize(vectors.remove(0));

        let mut scored: Vec<(ListingId, f32)> = self
            .entries
            .values()
            .map(|entry| (entry.id, dot(&query_vec, &entry.vector)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }

    pub fn entry(&self, id: ListingId) -> Option<&EmbeddingEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
