use listinglens_core::traits::TextGenerator;
use listinglens_core::types::MatchResult;
use std::fmt::Write as _;

/// Fixed narrative for an empty match set. Returned without calling the
/// generation service so the empty path stays deterministic and offline.
pub const NO_RESULTS_NARRATIVE: &str =
    "No listings matched your search. Try widening the price range or relaxing a constraint.";

/// Renders a buyer-facing exposé over the matches by delegating to the
/// text-generation service.
pub struct SummaryGenerator {
    generator: Box<dyn TextGenerator>,
}

impl SummaryGenerator {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn summarize(&self, matches: &[MatchResult]) -> anyhow::Result<String> {
        if matches.is_empty() {
            return Ok(NO_RESULTS_NARRATIVE.to_string());
        }
        self.generator.generate(&summary_prompt(matches))
    }
}

/// Deterministic prompt over the ranked matches. Fields appear in the same
/// order as the embedding text, so "what the model sees" stays consistent
/// across indexing and summarization.
pub fn summary_prompt(matches: &[MatchResult]) -> String {
    let mut prompt = String::from(
        "Based on the following real estate listings, write a compelling summary or \
         exposé highlighting the key features and benefits of these properties:\n\n",
    );
    for m in matches {
        let r = &m.record;
        // Write into a String cannot fail.
        let _ = write!(
            prompt,
            "Listing {}:\nNeighborhood: {}\nPrice: ${}\nBedrooms: {}\nBathrooms: {}\n\
             House Size: {} sqft\nDescription: {}\nNeighborhood Description: {}\n\n",
            m.rank,
            r.neighborhood,
            r.price,
            r.bedrooms,
            r.bathrooms,
            r.size,
            r.description,
            r.neighborhood_description,
        );
    }
    prompt.push_str(
        "Please provide a summary that would appeal to a potential buyer, focusing on \
         how these listings meet the user's preferences.",
    );
    prompt
}
