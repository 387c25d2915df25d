//! Domain types shared by the parser, store, index and search engine.

use serde::{Deserialize, Serialize};

pub type ListingId = u64;

/// One structured real-estate listing.
///
/// - `id`: stable identifier, assigned at parse time
/// - `price`: positive, in currency units
/// - `bathrooms`: may be fractional (e.g. 2.5)
/// - `size`: positive, in square feet
///
/// Every field is present and non-empty after a successful parse; a
/// fragment that cannot fill all of them is rejected, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    pub neighborhood: String,
    pub price: u64,
    pub bedrooms: u32,
    pub bathrooms: f32,
    pub size: f64,
    pub description: String,
    pub neighborhood_description: String,
}

/// A raw fragment the parser could not turn into a record, kept for
/// diagnosis only.
#[derive(Debug, Clone)]
pub struct RejectedFragment {
    pub text: String,
    pub reason: String,
}

/// Transient result of one parse run: valid records in input order plus
/// the fragments that were dropped. Never persisted.
#[derive(Debug, Default)]
pub struct ParseBatch {
    pub records: Vec<ListingRecord>,
    pub rejects: Vec<RejectedFragment>,
}

/// Buyer-side search input. Every constraint is optional; at least one
/// of them (or the free-text `requirements`) must be present for the
/// query to be accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub neighborhood: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<f32>,
    pub min_size: Option<f64>,
    pub requirements: Option<String>,
}

impl SearchCriteria {
    /// True when no structured constraint and no free text was supplied.
    pub fn is_empty(&self) -> bool {
        self.neighborhood.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_bedrooms.is_none()
            && self.min_bathrooms.is_none()
            && self.min_size.is_none()
            && self.requirements.as_deref().map_or(true, |r| r.trim().is_empty())
    }

    /// Structured predicate: AND over all supplied constraints, with
    /// absent constraints always true. Neighborhood matches by
    /// case-insensitive substring.
    pub fn admits(&self, record: &ListingRecord) -> bool {
        if let Some(n) = &self.neighborhood {
            if !record.neighborhood.to_lowercase().contains(&n.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if record.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if record.price > max {
                return false;
            }
        }
        if let Some(min) = self.min_bedrooms {
            if record.bedrooms < min {
                return false;
            }
        }
        if let Some(min) = self.min_bathrooms {
            if record.bathrooms < min {
                return false;
            }
        }
        if let Some(min) = self.min_size {
            if record.size < min {
                return false;
            }
        }
        true
    }
}

/// One ranked search hit. `score` is a similarity (higher is closer),
/// `rank` is 1-based; ties are broken by ascending `id` so repeated
/// searches return identical output.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub record: ListingRecord,
    pub score: f32,
    pub rank: usize,
}
