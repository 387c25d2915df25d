use listinglens_core::store::ListingStore;
use listinglens_core::types::{ListingRecord, ParseBatch, SearchCriteria};
use listinglens_core::Error;
use tempfile::TempDir;

fn record(id: u64, neighborhood: &str, price: u64) -> ListingRecord {
    ListingRecord {
        id,
        neighborhood: neighborhood.to_string(),
        price,
        bedrooms: 3,
        bathrooms: 2.0,
        size: 1800.0,
        description: "A bright family home.".to_string(),
        neighborhood_description: "Quiet streets.".to_string(),
    }
}

fn batch_of(records: Vec<ListingRecord>) -> ParseBatch {
    ParseBatch { records, rejects: vec![] }
}

#[test]
fn add_batch_appends_and_next_id_advances() {
    let mut store = ListingStore::new();
    assert_eq!(store.next_id(), 0);

    store
        .add_batch(&batch_of(vec![record(0, "Green Oaks", 800_000), record(1, "Maple Ridge", 450_000)]))
        .expect("add");
    assert_eq!(store.len(), 2);
    assert_eq!(store.next_id(), 2);
    assert_eq!(store.get(1).expect("get").neighborhood, "Maple Ridge");
}

#[test]
fn add_batch_refuses_id_collisions() {
    let mut store = ListingStore::new();
    store.add_batch(&batch_of(vec![record(0, "Green Oaks", 800_000)])).expect("add");

    let err = store
        .add_batch(&batch_of(vec![record(0, "Harbor View", 900_000)]))
        .expect_err("collision");
    assert!(matches!(err, Error::Operation(_)));
    // The refused batch must not have been partially applied.
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(0).expect("get").neighborhood, "Green Oaks");
}

#[test]
fn get_and_remove_report_not_found() {
    let mut store = ListingStore::new();
    assert!(matches!(store.get(42), Err(Error::NotFound(42))));
    assert!(matches!(store.remove(42), Err(Error::NotFound(42))));
}

#[test]
fn all_returns_records_in_ascending_id_order() {
    let mut store = ListingStore::new();
    store
        .add_batch(&batch_of(vec![record(5, "C", 3), record(1, "A", 1), record(3, "B", 2)]))
        .expect("add");
    let ids: Vec<u64> = store.all().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 5]);
    assert_eq!(store.next_id(), 6);
}

#[test]
fn save_then_load_round_trips() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("listings.json");

    let mut store = ListingStore::new();
    store
        .add_batch(&batch_of(vec![record(0, "Green Oaks", 800_000), record(1, "Maple Ridge", 450_000)]))
        .expect("add");
    store.save(&path).expect("save");

    let loaded = ListingStore::load(&path);
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get(0).expect("get").price, 800_000);
}

#[test]
fn malformed_persisted_file_loads_as_empty() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("listings.json");
    std::fs::write(&path, "{ not json").expect("write");

    let store = ListingStore::load(&path);
    assert!(store.is_empty());
}

#[test]
fn missing_persisted_file_loads_as_empty() {
    let tmp = TempDir::new().expect("tempdir");
    let store = ListingStore::load(&tmp.path().join("absent.json"));
    assert!(store.is_empty());
}

#[test]
fn criteria_admits_applies_all_supplied_constraints() {
    let rec = record(0, "Green Oaks", 800_000);

    let criteria = SearchCriteria {
        neighborhood: Some("green".to_string()),
        max_price: Some(900_000),
        min_bedrooms: Some(3),
        ..Default::default()
    };
    assert!(criteria.admits(&rec));

    let too_cheap = SearchCriteria { min_price: Some(850_000), ..Default::default() };
    assert!(!too_cheap.admits(&rec));

    let wrong_place = SearchCriteria {
        neighborhood: Some("Harbor".to_string()),
        ..Default::default()
    };
    assert!(!wrong_place.admits(&rec));
}

#[test]
fn criteria_emptiness_ignores_whitespace_requirements() {
    assert!(SearchCriteria::default().is_empty());
    assert!(SearchCriteria { requirements: Some("   ".to_string()), ..Default::default() }.is_empty());
    assert!(!SearchCriteria { requirements: Some("garden".to_string()), ..Default::default() }.is_empty());
    assert!(!SearchCriteria { min_size: Some(1000.0), ..Default::default() }.is_empty());
}
