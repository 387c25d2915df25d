use std::env;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use listinglens_core::config::Config;
use listinglens_core::parser::RecordParser;
use listinglens_core::store::ListingStore;
use listinglens_core::types::SearchCriteria;
use listinglens_hybrid::HybridSearchEngine;
use listinglens_index::embed::RemoteEmbedder;
use listinglens_index::EmbeddingIndexer;
use listinglens_llm::{generate_listings, RemoteGenerator, SummaryGenerator};
use tracing_subscriber::EnvFilter;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {prog} <generate|search> [args...]");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "generate" => {
            let count: usize = args
                .first()
                .map(|a| a.parse().context("count must be a number"))
                .transpose()?
                .unwrap_or(10);
            let listings_path = config.listings_path();
            let mut store = ListingStore::load(&listings_path);

            let generator = RemoteGenerator::new(&config.openai()?)?;
            println!("Generating {count} listings...");
            let raw = generate_listings(&generator, count)?;

            let batch = RecordParser::new().parse(&raw, count, store.next_id())?;
            if !batch.rejects.is_empty() {
                println!("⚠️  {} fragment(s) could not be parsed:", batch.rejects.len());
                for reject in &batch.rejects {
                    println!("   - {}", reject.reason);
                }
            }
            let added = store.add_batch(&batch)?;
            store.save(&listings_path)?;
            println!("✅ Stored {added} listings ({} total) in {}", store.len(), listings_path.display());
        }
        "search" => {
            let (criteria, k) = parse_search_args(&args, config.search().default_k)?;
            let listings_path = config.listings_path();
            let store = ListingStore::load(&listings_path);
            if store.is_empty() {
                println!("No listings stored yet. Run `listinglens generate` first.");
                return Ok(());
            }

            let openai = config.openai()?;
            let embedder = RemoteEmbedder::new(&openai)?;
            let mut index = EmbeddingIndexer::new(Box::new(embedder));
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner());
            spinner.set_message(format!("Indexing {} listings...", store.len()));
            spinner.enable_steady_tick(std::time::Duration::from_millis(120));
            index.build(&store)?;
            spinner.finish_with_message("Index ready");

            let engine = HybridSearchEngine::new(config.search().overfetch_factor);
            let matches = engine.search(&store, &index, &criteria, k)?;

            for m in &matches {
                let r = &m.record;
                println!("### Match {} (score {:.4})", m.rank, m.score);
                println!("Listing {}: {} (${})", r.id, r.neighborhood, r.price);
                println!("{} bd / {} ba / {} sqft", r.bedrooms, r.bathrooms, r.size);
                println!("{}\n", r.description);
            }
            if matches.is_empty() {
                println!("No matching listings found based on your preferences.");
            }

            let summarizer = SummaryGenerator::new(Box::new(RemoteGenerator::new(&openai)?));
            let narrative = summarizer.summarize(&matches)?;
            println!("--- Summary ---\n{narrative}");
        }
        _ => {
            eprintln!("Unknown command: {cmd}");
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Flags mirror the structured criteria; everything left over becomes the
/// free-text requirements.
fn parse_search_args(args: &[String], default_k: usize) -> anyhow::Result<(SearchCriteria, usize)> {
    let mut criteria = SearchCriteria::default();
    let mut k = default_k;
    let mut free_text: Vec<String> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut take = |name: &str| -> anyhow::Result<String> {
            iter.next()
                .cloned()
                .with_context(|| format!("{name} needs a value"))
        };
        match arg.as_str() {
            "--neighborhood" => criteria.neighborhood = Some(take("--neighborhood")?),
            "--min-price" => criteria.min_price = Some(take("--min-price")?.parse()?),
            "--max-price" => criteria.max_price = Some(take("--max-price")?.parse()?),
            "--min-bedrooms" => criteria.min_bedrooms = Some(take("--min-bedrooms")?.parse()?),
            "--min-bathrooms" => criteria.min_bathrooms = Some(take("--min-bathrooms")?.parse()?),
            "--min-size" => criteria.min_size = Some(take("--min-size")?.parse()?),
            "-k" | "--top" => k = take("-k")?.parse()?,
            other => free_text.push(other.to_string()),
        }
    }
    if !free_text.is_empty() {
        criteria.requirements = Some(free_text.join(" "));
    }
    Ok((criteria, k))
}
