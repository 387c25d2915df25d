//! Hybrid query path: structured filtering merged with semantic ranking.
//!
//! The planner turns buyer criteria into a structured predicate plus a
//! canonical semantic query string; the engine filters the store, over-fetches
//! semantic neighbors from the index, intersects the two and ranks what
//! survives. "No matches" is a normal outcome, never an error.

use listinglens_core::error::{Error, Result};
use listinglens_core::store::ListingStore;
use listinglens_core::types::{ListingId, ListingRecord, MatchResult, SearchCriteria};
use listinglens_index::EmbeddingIndexer;
use std::collections::BTreeSet;
use tracing::debug;

pub struct QueryPlan {
    pub predicate: Box<dyn Fn(&ListingRecord) -> bool>,
    pub semantic_query: String,
}

impl std::fmt::Debug for QueryPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPlan")
            .field("semantic_query", &self.semantic_query)
            .finish_non_exhaustive()
    }
}

pub struct QueryPlanner;

impl QueryPlanner {
    /// Combine all supplied constraints into an AND predicate and restate
    /// them as query text, so a structured-only request still yields a
    /// meaningful embedding string and both request kinds share one path.
    pub fn plan(criteria: &SearchCriteria) -> Result<QueryPlan> {
        if criteria.is_empty() {
            return Err(Error::Query("empty criteria".to_string()));
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(n) = &criteria.neighborhood {
            parts.push(format!("in {n}"));
        }
        match (criteria.min_price, criteria.max_price) {
            (Some(min), Some(max)) => parts.push(format!("priced between ${min} and ${max}")),
            (Some(min), None) => parts.push(format!("priced above ${min}")),
            (None, Some(max)) => parts.push(format!("priced under ${max}")),
            (None, None) => {}
        }
        if let Some(beds) = criteria.min_bedrooms {
            parts.push(format!("having at least {beds} bedrooms"));
        }
        if let Some(baths) = criteria.min_bathrooms {
            parts.push(format!("having at least {baths} bathrooms"));
        }
        if let Some(size) = criteria.min_size {
            parts.push(format!("with house size of at least {size} sqft"));
        }
        if let Some(req) = criteria.requirements.as_deref().map(str::trim).filter(|r| !r.is_empty())
        {
            parts.push(format!("that {req}"));
        }

        let semantic_query = format!("A home {}.", parts.join(", "));
        let owned = criteria.clone();
        Ok(QueryPlan {
            predicate: Box::new(move |record| owned.admits(record)),
            semantic_query,
        })
    }
}

pub struct HybridSearchEngine {
    overfetch_factor: usize,
}

impl Default for HybridSearchEngine {
    fn default() -> Self {
        Self::new(3)
    }
}

impl HybridSearchEngine {
    pub fn new(overfetch_factor: usize) -> Self {
        Self { overfetch_factor: overfetch_factor.max(2) }
    }

    /// Ranked matches for `criteria`, at most `k`.
    ///
    /// The index is asked for more neighbors than needed because the nearest
    /// ones may fall outside the structured-eligible set; if the first fetch
    /// leaves fewer than `k` survivors the request widens once to the whole
    /// index before returning whatever is available. Ordering is
    /// deterministic for a fixed store, index and criteria.
    pub fn search(
        &self,
        store: &ListingStore,
        index: &EmbeddingIndexer,
        criteria: &SearchCriteria,
        k: usize,
    ) -> Result<Vec<MatchResult>> {
        let plan = QueryPlanner::plan(criteria)?;
        if k == 0 {
            return Ok(vec![]);
        }

        let eligible: BTreeSet<ListingId> = store
            .all()
            .into_iter()
            .filter(|record| (plan.predicate)(*record))
            .map(|record| record.id)
            .collect();
        if eligible.is_empty() {
            debug!("structured filter admitted no records");
            return Ok(vec![]);
        }

        let fetch = (self.overfetch_factor * k).min(index.len());
        let neighbors = index.query(&plan.semantic_query, fetch)?;
        let mut survivors = intersect(&neighbors, &eligible);

        if survivors.len() < k && fetch < index.len() {
            // One widening retry bounds worst-case index load.
            let widened = index.query(&plan.semantic_query, index.len())?;
            survivors = intersect(&widened, &eligible);
        }
        survivors.truncate(k);

        let mut matches = Vec::with_capacity(survivors.len());
        for (rank, (id, score)) in survivors.into_iter().enumerate() {
            matches.push(MatchResult {
                record: store.get(id)?.clone(),
                score,
                rank: rank + 1,
            });
        }
        Ok(matches)
    }
}

/// Neighbors restricted to the eligible set, neighbor order preserved.
fn intersect(
    neighbors: &[(ListingId, f32)],
    eligible: &BTreeSet<ListingId>,
) -> Vec<(ListingId, f32)> {
    neighbors
        .iter()
        .filter(|(id, _)| eligible.contains(id))
        .copied()
        .collect()
}
