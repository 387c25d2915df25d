//! Tolerant parser for model-generated listing text.
//!
//! Generated output follows no single delimiter convention, so parsing runs
//! as a pipeline of stages that each report success or failure instead of
//! throwing past their boundary: split into fragments, label-match lines,
//! coerce values, validate. One malformed fragment never aborts the batch;
//! it lands in `ParseBatch::rejects` with a reason.

use crate::error::{Error, Result};
use crate::types::{ListingId, ListingRecord, ParseBatch, RejectedFragment};
use regex::Regex;
use tracing::{debug, warn};

/// Fields a fragment must fill before it becomes a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Neighborhood,
    Price,
    Bedrooms,
    Bathrooms,
    Size,
    Description,
    NeighborhoodDescription,
}

#[derive(Debug, Default)]
struct FragmentFields {
    neighborhood: Option<String>,
    price: Option<u64>,
    bedrooms: Option<u32>,
    bathrooms: Option<f32>,
    size: Option<f64>,
    description: Option<String>,
    neighborhood_description: Option<String>,
}

pub struct RecordParser {
    entry_marker: Regex,
    label_line: Regex,
    neighborhood_start: Regex,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser {
    // Patterns are literals; compiling them cannot fail at runtime.
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        Self {
            entry_marker: Regex::new(r"(?m)^\s*\d+\s*[.)]\s+").unwrap(),
            label_line: Regex::new(r"^\s*(?:[-*]\s*)?([A-Za-z][A-Za-z /_-]{0,40}?)\s*:\s*(.*)$")
                .unwrap(),
            neighborhood_start: Regex::new(r"(?i)^\s*(?:[-*]\s*)?neighborhood\s*:").unwrap(),
        }
    }

    /// Parse raw generated text into a batch of validated records.
    ///
    /// Ids are assigned sequentially starting at `next_id` (the caller
    /// passes `store.next_id()`), so repeated runs against the same store
    /// never collide. Recovering fewer fragments than `expected_count` is a
    /// reported discrepancy, not an error; recovering none at all is.
    pub fn parse(
        &self,
        raw_text: &str,
        expected_count: usize,
        next_id: ListingId,
    ) -> Result<ParseBatch> {
        let fragments = self.split_fragments(raw_text);
        if fragments.is_empty() {
            return Err(Error::Parse("no listings recovered".to_string()));
        }

        let mut batch = ParseBatch::default();
        for fragment in &fragments {
            match self.parse_fragment(fragment) {
                Ok(fields) => {
                    let id = next_id + batch.records.len() as ListingId;
                    batch.records.push(build_record(id, fields));
                }
                Err(reason) => {
                    debug!(%reason, "fragment rejected");
                    batch.rejects.push(RejectedFragment {
                        text: fragment.clone(),
                        reason,
                    });
                }
            }
        }

        if batch.records.len() < expected_count {
            warn!(
                expected = expected_count,
                parsed = batch.records.len(),
                rejected = batch.rejects.len(),
                "generation batch came up short"
            );
        }
        Ok(batch)
    }

    /// Boundary heuristic: prefer numbered-entry markers (`1.` / `2)` at
    /// line start); fall back to blank-line-separated blocks, opening a new
    /// fragment at each block that starts with a `Neighborhood:` label.
    fn split_fragments(&self, raw_text: &str) -> Vec<String> {
        let markers: Vec<_> = self.entry_marker.find_iter(raw_text).collect();
        if !markers.is_empty() {
            let mut fragments = Vec::with_capacity(markers.len());
            for (i, m) in markers.iter().enumerate() {
                let end = markers.get(i + 1).map_or(raw_text.len(), |n| n.start());
                let body = raw_text[m.end()..end].trim();
                if !body.is_empty() {
                    fragments.push(body.to_string());
                }
            }
            return fragments;
        }

        let mut fragments: Vec<String> = Vec::new();
        for block in raw_text.split("\n\n") {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }
            if self.neighborhood_start.is_match(block) || fragments.is_empty() {
                fragments.push(block.to_string());
            } else if let Some(current) = fragments.last_mut() {
                current.push_str("\n");
                current.push_str(block);
            }
        }
        fragments
    }

    /// Line-oriented field extraction. Labels match case-insensitively with
    /// punctuation and synonym tolerance; lines without a known label
    /// continue the previous free-text field.
    fn parse_fragment(&self, fragment: &str) -> std::result::Result<FragmentFields, String> {
        let mut fields = FragmentFields::default();
        let mut open_text: Option<Field> = None;

        for line in fragment.lines() {
            let labeled = self
                .label_line
                .captures(line)
                .and_then(|c| match (c.get(1), c.get(2)) {
                    (Some(label), Some(value)) => resolve_label(label.as_str())
                        .map(|f| (f, value.as_str().trim().to_string())),
                    _ => None,
                });

            let Some((mut field, value)) = labeled else {
                // Continuation of a multi-line description.
                if let Some(open) = open_text {
                    let text = line.trim();
                    if !text.is_empty() {
                        append_text(&mut fields, open, text);
                    }
                }
                continue;
            };

            // A second bare "Neighborhood:" after the house description is
            // how models often label the neighborhood description.
            if field == Field::Neighborhood
                && fields.neighborhood.is_some()
                && fields.neighborhood_description.is_none()
            {
                field = Field::NeighborhoodDescription;
            }

            open_text = None;
            match field {
                Field::Neighborhood => fields.neighborhood = non_empty(&value),
                Field::Price => {
                    fields.price =
                        Some(coerce_price(&value).ok_or_else(|| format!("bad price '{value}'"))?);
                }
                Field::Bedrooms => {
                    fields.bedrooms = Some(
                        coerce_count(&value).ok_or_else(|| format!("bad bedrooms '{value}'"))?,
                    );
                }
                Field::Bathrooms => {
                    fields.bathrooms = Some(
                        coerce_fraction(&value)
                            .ok_or_else(|| format!("bad bathrooms '{value}'"))?,
                    );
                }
                Field::Size => {
                    fields.size =
                        Some(coerce_area(&value).ok_or_else(|| format!("bad size '{value}'"))?);
                }
                Field::Description => {
                    fields.description = non_empty(&value);
                    open_text = Some(Field::Description);
                }
                Field::NeighborhoodDescription => {
                    fields.neighborhood_description = non_empty(&value);
                    open_text = Some(Field::NeighborhoodDescription);
                }
            }
        }

        validate(&fields)?;
        Ok(fields)
    }
}

fn resolve_label(label: &str) -> Option<Field> {
    let key: String = label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    match key.as_str() {
        "neighborhood" => Some(Field::Neighborhood),
        "price" | "listingprice" | "askingprice" => Some(Field::Price),
        "bedrooms" | "bedroomcount" | "beds" => Some(Field::Bedrooms),
        "bathrooms" | "bathroomcount" | "baths" => Some(Field::Bathrooms),
        "housesize" | "size" | "sizesqft" => Some(Field::Size),
        "description" | "housedescription" => Some(Field::Description),
        "neighborhooddescription" => Some(Field::NeighborhoodDescription),
        _ => None,
    }
}

fn append_text(fields: &mut FragmentFields, field: Field, text: &str) {
    let slot = match field {
        Field::Description => &mut fields.description,
        Field::NeighborhoodDescription => &mut fields.neighborhood_description,
        _ => return,
    };
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Leading numeric token of `value` with `$`, commas and surrounding
/// whitespace stripped; trailing unit words ("sqft") are ignored.
fn numeric_prefix(value: &str) -> String {
    value
        .trim()
        .trim_start_matches('$')
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect()
}

fn coerce_price(value: &str) -> Option<u64> {
    numeric_prefix(value).parse::<u64>().ok().filter(|p| *p > 0)
}

fn coerce_count(value: &str) -> Option<u32> {
    let token = numeric_prefix(value);
    // "3.0 bedrooms" still counts as 3 whole bedrooms.
    token
        .parse::<u32>()
        .ok()
        .or_else(|| token.parse::<f64>().ok().filter(|n| n.fract() == 0.0).map(|n| n as u32))
}

fn coerce_fraction(value: &str) -> Option<f32> {
    numeric_prefix(value).parse::<f32>().ok().filter(|b| *b >= 0.0)
}

fn coerce_area(value: &str) -> Option<f64> {
    numeric_prefix(value).parse::<f64>().ok().filter(|s| *s > 0.0)
}

fn validate(fields: &FragmentFields) -> std::result::Result<(), String> {
    let missing = [
        ("neighborhood", fields.neighborhood.is_none()),
        ("price", fields.price.is_none()),
        ("bedrooms", fields.bedrooms.is_none()),
        ("bathrooms", fields.bathrooms.is_none()),
        ("size", fields.size.is_none()),
        ("description", fields.description.is_none()),
        ("neighborhood description", fields.neighborhood_description.is_none()),
    ]
    .iter()
    .filter(|(_, absent)| *absent)
    .map(|(name, _)| *name)
    .collect::<Vec<_>>();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing {}", missing.join(", ")))
    }
}

fn build_record(id: ListingId, fields: FragmentFields) -> ListingRecord {
    // `validate` ran first; the fields are all present.
    ListingRecord {
        id,
        neighborhood: fields.neighborhood.unwrap_or_default(),
        price: fields.price.unwrap_or_default(),
        bedrooms: fields.bedrooms.unwrap_or_default(),
        bathrooms: fields.bathrooms.unwrap_or_default(),
        size: fields.size.unwrap_or_default(),
        description: fields.description.unwrap_or_default(),
        neighborhood_description: fields.neighborhood_description.unwrap_or_default(),
    }
}
