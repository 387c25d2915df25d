//! Text-generation collaborators: listing generation and match summaries.
//!
//! Everything here funnels through `listinglens_core::traits::TextGenerator`
//! so tests swap in offline fakes and never touch the network.

pub mod provider;
pub mod summary;

pub use provider::RemoteGenerator;
pub use summary::{SummaryGenerator, NO_RESULTS_NARRATIVE};

use listinglens_core::traits::TextGenerator;
use tracing::info;

/// Prompt for a batch of synthetic listings. Contains one fully worked
/// example so the model keeps the labeled layout the parser expects.
/// The parser must still treat the reply as untrusted.
pub fn listing_prompt(count: usize) -> String {
    format!(
        "Your goal is to generate realistic real estate listings that include the \
         following parameters: neighborhood, price, bedroom count, bathroom count, \
         house size, a description of the house and a neighborhood description.\n\
         One example is:\n\
         Neighborhood: Green Oaks\n\
         Price: $800,000\n\
         Bedrooms: 3\n\
         Bathrooms: 2\n\
         House Size: 2,000 sqft\n\n\
         Description: Welcome to this eco-friendly oasis nestled in the heart of \
         Green Oaks. This charming 3-bedroom, 2-bathroom home boasts energy-efficient \
         features such as solar panels and a well-insulated structure.\n\n\
         Neighborhood Description: Green Oaks is a close-knit, environmentally-conscious \
         community with access to organic grocery stores, community gardens, and bike paths.\n\n\
         Create {count} listings, numbered 1. to {count}."
    )
}

/// Ask the generation service for `count` listings and hand back its raw
/// reply for the parser.
pub fn generate_listings(generator: &dyn TextGenerator, count: usize) -> anyhow::Result<String> {
    info!(count, "requesting generated listings");
    generator.generate(&listing_prompt(count))
}
