use listinglens_core::store::ListingStore;
use listinglens_core::types::{ListingRecord, ParseBatch, SearchCriteria};
use listinglens_core::Error;
use listinglens_hybrid::{HybridSearchEngine, QueryPlanner};
use listinglens_index::embed::HashedEmbedder;
use listinglens_index::EmbeddingIndexer;

fn record(id: u64, neighborhood: &str, price: u64, description: &str) -> ListingRecord {
    ListingRecord {
        id,
        neighborhood: neighborhood.to_string(),
        price,
        bedrooms: 3,
        bathrooms: 2.0,
        size: 1800.0,
        description: description.to_string(),
        neighborhood_description: "Friendly streets.".to_string(),
    }
}

fn fixture() -> (ListingStore, EmbeddingIndexer) {
    let mut store = ListingStore::new();
    store
        .add_batch(&ParseBatch {
            records: vec![
                record(0, "Green Oaks", 200_000, "Starter home with a sunny garden."),
                record(1, "Maple Ridge", 450_000, "Renovated kitchen and a big garden."),
                record(2, "Harbor View", 900_000, "Penthouse with marina views."),
            ],
            rejects: vec![],
        })
        .expect("add");
    let mut index = EmbeddingIndexer::new(Box::new(HashedEmbedder::default()));
    index.build(&store).expect("build");
    (store, index)
}

#[test]
fn empty_criteria_is_rejected() {
    let err = QueryPlanner::plan(&SearchCriteria::default()).expect_err("empty");
    assert!(matches!(err, Error::Query(_)));
}

#[test]
fn structured_only_criteria_still_yield_semantic_text() {
    let plan = QueryPlanner::plan(&SearchCriteria {
        max_price: Some(500_000),
        min_bedrooms: Some(3),
        ..Default::default()
    })
    .expect("plan");
    assert!(plan.semantic_query.contains("priced under $500000"));
    assert!(plan.semantic_query.contains("at least 3 bedrooms"));
}

#[test]
fn plan_predicate_matches_criteria() {
    let plan = QueryPlanner::plan(&SearchCriteria {
        neighborhood: Some("maple".to_string()),
        ..Default::default()
    })
    .expect("plan");
    assert!((plan.predicate)(&record(1, "Maple Ridge", 450_000, "x")));
    assert!(!(plan.predicate)(&record(2, "Harbor View", 900_000, "x")));
}

#[test]
fn results_respect_every_structured_constraint() {
    let (store, index) = fixture();
    let criteria = SearchCriteria {
        max_price: Some(500_000),
        requirements: Some("a garden for the kids".to_string()),
        ..Default::default()
    };

    let results = HybridSearchEngine::default().search(&store, &index, &criteria, 5).expect("search");

    // Eligible set is the two cheaper listings; k=5 cannot widen that.
    assert_eq!(results.len(), 2);
    for m in &results {
        assert!(m.record.price <= 500_000);
    }
    let ranks: Vec<usize> = results.iter().map(|m| m.rank).collect();
    assert_eq!(ranks, vec![1, 2]);
}

#[test]
fn zero_eligible_records_is_empty_not_an_error() {
    let (store, index) = fixture();
    let criteria = SearchCriteria { min_price: Some(5_000_000), ..Default::default() };
    let results = HybridSearchEngine::default().search(&store, &index, &criteria, 3).expect("search");
    assert!(results.is_empty());
}

#[test]
fn repeated_searches_return_identical_ordering() {
    let (store, index) = fixture();
    let criteria = SearchCriteria {
        requirements: Some("garden".to_string()),
        ..Default::default()
    };
    let engine = HybridSearchEngine::default();

    let first = engine.search(&store, &index, &criteria, 3).expect("search");
    let second = engine.search(&store, &index, &criteria, 3).expect("search");

    let ids = |rs: &[listinglens_core::types::MatchResult]| -> Vec<u64> {
        rs.iter().map(|m| m.record.id).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    for (a, b) in first.iter().zip(&second) {
        assert!((a.score - b.score).abs() < f32::EPSILON);
        assert_eq!(a.rank, b.rank);
    }
}

#[test]
fn widening_recovers_eligible_records_outside_first_fetch() {
    // Many semantically-close decoys outside the eligible set push the one
    // eligible record past the first over-fetch window.
    let mut store = ListingStore::new();
    let mut records = Vec::new();
    for id in 0..20 {
        records.push(record(id, "Green Oaks", 800_000, "Sunny garden with roses and a patio."));
    }
    records.push(record(20, "Green Oaks", 300_000, "Small flat, street parking."));
    store.add_batch(&ParseBatch { records, rejects: vec![] }).expect("add");

    let mut index = EmbeddingIndexer::new(Box::new(HashedEmbedder::default()));
    index.build(&store).expect("build");

    let criteria = SearchCriteria {
        max_price: Some(400_000),
        requirements: Some("sunny garden with roses".to_string()),
        ..Default::default()
    };
    let results = HybridSearchEngine::new(3).search(&store, &index, &criteria, 2).expect("search");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, 20);
}

#[test]
fn search_with_zero_k_returns_empty() {
    let (store, index) = fixture();
    let criteria = SearchCriteria { requirements: Some("garden".to_string()), ..Default::default() };
    let results = HybridSearchEngine::default().search(&store, &index, &criteria, 0).expect("search");
    assert!(results.is_empty());
}
