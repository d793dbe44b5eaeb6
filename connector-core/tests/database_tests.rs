// Tests for the entity store

use connector_core::data::{Database, EntityKind, EntityStore};
use connector_core::error::StoreError;
use connector_core::link::LocationLink;
use connector_fetch::{Location, Router};
use tempfile::TempDir;

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    (temp_dir, db)
}

fn router(id: i64, location_id: i64, links: &[i64]) -> Router {
    Router {
        id,
        name: format!("core-{:02}", id),
        location_id,
        router_links: links.to_vec(),
    }
}

fn location(id: i64, name: &str) -> Location {
    Location {
        id,
        postcode: "LA1 1YW".to_string(),
        name: name.to_string(),
    }
}

// ============================================================================
// Database Creation Tests
// ============================================================================

#[test]
fn test_database_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db = Database::new(&db_path);
    assert!(db.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_database_exists() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    assert!(!Database::exists(&db_path));

    let _db = Database::new(&db_path).unwrap();
    assert!(Database::exists(&db_path));
}

#[test]
fn test_database_reopen_keeps_records() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    {
        let db = Database::new(&db_path).unwrap();
        db.put(&router(1, 1, &[2])).unwrap();
    }

    let db = Database::new(&db_path).unwrap();
    assert_eq!(db.router(1).unwrap(), Some(router(1, 1, &[2])));
}

// ============================================================================
// Record Tests
// ============================================================================

#[test]
fn test_put_and_get_router() {
    let (_temp_dir, db) = create_test_db();

    let stored = router(3, 7, &[15, 3, 15]);
    db.put(&stored).unwrap();

    assert_eq!(db.router(3).unwrap(), Some(stored));
}

#[test]
fn test_put_and_get_location() {
    let (_temp_dir, db) = create_test_db();

    db.put(&location(1, "Lancaster Castle")).unwrap();

    let loaded = db.location(1).unwrap().unwrap();
    assert_eq!(loaded.name, "Lancaster Castle");
    assert_eq!(loaded.postcode, "LA1 1YW");
}

#[test]
fn test_put_and_get_link() {
    let (_temp_dir, db) = create_test_db();

    let link = LocationLink::between(
        &location(1, "Lancaster Brewery"),
        &location(2, "Lancaster University"),
    );
    db.put(&link).unwrap();

    let loaded = db
        .link("Lancaster Brewery:Lancaster University")
        .unwrap()
        .unwrap();
    assert_eq!(loaded, link);
}

#[test]
fn test_missing_records_are_none() {
    let (_temp_dir, db) = create_test_db();

    assert!(db.router(42).unwrap().is_none());
    assert!(db.location(42).unwrap().is_none());
    assert!(db.link("nowhere:somewhere").unwrap().is_none());
}

#[test]
fn test_kinds_do_not_share_keys() {
    let (_temp_dir, db) = create_test_db();

    db.put(&router(1, 1, &[])).unwrap();
    db.put(&location(1, "Williamson Park")).unwrap();

    assert_eq!(db.router(1).unwrap().unwrap().name, "core-01");
    assert_eq!(db.location(1).unwrap().unwrap().name, "Williamson Park");
    assert_eq!(db.count(EntityKind::Router).unwrap(), 1);
    assert_eq!(db.count(EntityKind::Location).unwrap(), 1);
}

#[test]
fn test_put_overwrites_whole_record() {
    let (_temp_dir, db) = create_test_db();

    db.put(&router(1, 1, &[2, 3])).unwrap();
    db.put(&router(1, 4, &[])).unwrap();

    let loaded = db.router(1).unwrap().unwrap();
    assert_eq!(loaded.location_id, 4);
    assert!(loaded.router_links.is_empty());
    assert_eq!(db.count(EntityKind::Router).unwrap(), 1);
}

#[test]
fn test_corrupt_record_is_an_error_not_missing() {
    let (_temp_dir, db) = create_test_db();

    db.put_value(EntityKind::Router, "9", "{\"id\": 9, \"name\"")
        .unwrap();

    let result = db.router(9);
    assert!(matches!(result, Err(StoreError::CodecError(_))));
}

#[test]
fn test_records_are_timestamped() {
    let (_temp_dir, db) = create_test_db();

    db.put(&location(5, "Birmingham Hippodrome")).unwrap();

    let stored_at: i64 = db
        .get_connection()
        .query_row(
            "SELECT stored_at FROM entities WHERE kind = 'location' AND key = '5'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(stored_at > 0);
}

// ============================================================================
// Listing and Clearing Tests
// ============================================================================

#[test]
fn test_list_links_ordered_by_identifier() {
    let (_temp_dir, db) = create_test_db();

    let castle = location(1, "Lancaster Castle");
    let brewery = location(2, "Lancaster Brewery");
    let park = location(3, "Williamson Park");

    db.put(&LocationLink::between(&park, &castle)).unwrap();
    db.put(&LocationLink::between(&castle, &brewery)).unwrap();

    let links = db.list_links().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].unique_id, "Lancaster Brewery:Lancaster Castle");
    assert_eq!(links[0].connection, "[Lancaster Castle] <-> [Lancaster Brewery]");
    assert_eq!(links[1].unique_id, "Lancaster Castle:Williamson Park");
}

#[test]
fn test_clear_removes_everything() {
    let (_temp_dir, db) = create_test_db();

    db.put(&router(1, 1, &[2])).unwrap();
    db.put(&location(1, "Lancaster Castle")).unwrap();
    db.put(&LocationLink::between(
        &location(1, "Lancaster Castle"),
        &location(2, "Lancaster Brewery"),
    ))
    .unwrap();

    assert_eq!(db.clear().unwrap(), 3);
    assert!(db.router(1).unwrap().is_none());
    assert!(db.list_links().unwrap().is_empty());
    assert_eq!(db.clear().unwrap(), 0);
}

#[test]
fn test_in_memory_database() {
    let db = Database::open_in_memory().unwrap();

    db.put(&router(1, 1, &[])).unwrap();
    assert!(db.router(1).unwrap().is_some());
}
