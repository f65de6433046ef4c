//! Integration tests for tables, typed loaders and store repair.

use starlane::error::{ErrorFilter, ErrorKind, FilterPolicy, RegistryError};
use starlane::schema::{encode, CommodityMessage};
use starlane::store::{Database, LogStore, Table, TypedLoader};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn commodity(id: u32, name: &str) -> CommodityMessage {
    CommodityMessage {
        id,
        name: name.to_string(),
        category_id: 1,
        is_rare: false,
        is_non_marketable: false,
        average_cr: 100,
    }
}

fn seed(database: &Database) {
    let mut table = database.commodities().unwrap();
    for (id, name) in [(1, "Tea"), (2, "Gold"), (3, "Coffee")] {
        table.put_message(&commodity(id, name)).unwrap();
    }
    table.flush().unwrap();
}

/// Loader callback that rejects "Gold" with a filterable error.
fn reject_gold(item: CommodityMessage, seen: &mut Vec<String>) -> Result<(), RegistryError> {
    if item.name == "Gold" {
        return Err(RegistryError::Unknown {
            reference: starlane::error::Reference::Commodity,
            id: item.id,
            referrer: item.name,
        });
    }
    seen.push(item.name);
    Ok(())
}

// =============================================================================
// Repair
// =============================================================================

#[test]
fn test_filtered_failure_keeps_store_intact() {
    let temp = TempDir::new().unwrap();
    let database = Database::open(temp.path()).unwrap();
    seed(&database);

    let mut seen = Vec::new();
    let report = {
        let mut table = database.commodities().unwrap();
        let mut loader = TypedLoader::schema(|item| reject_gold(item, &mut seen));
        table.load_data(&mut loader, &ErrorFilter::default()).unwrap()
    };

    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(seen, ["Tea", "Coffee"]);
    assert_eq!(database.commodities().unwrap().count(), 3);
}

#[test]
fn test_fatal_failure_deletes_key_and_aborts() {
    let temp = TempDir::new().unwrap();
    let database = Database::open(temp.path()).unwrap();
    seed(&database);

    let mut seen = Vec::new();
    let aborted = {
        let mut table = database.commodities().unwrap();
        let mut loader = TypedLoader::schema(|item| reject_gold(item, &mut seen));
        table
            .load_data(&mut loader, &ErrorFilter::with_policy(FilterPolicy::strict()))
            .unwrap_err()
    };

    assert_eq!(aborted.table, "commodities");
    assert_eq!(aborted.completed, 1);
    assert_eq!(aborted.source.kind(), ErrorKind::Unknown);
    assert_eq!(seen, ["Tea"]);

    // The deletion is durable; a second load runs clean.
    let table = database.commodities().unwrap();
    assert_eq!(table.count(), 2);
    assert!(table.get_message::<CommodityMessage>(2).unwrap().is_none());
}

#[test]
fn test_undecodable_value_is_malformed() {
    let mut table = Table::in_memory("commodities");
    table.put(&7u32.to_le_bytes(), &[0xff]).unwrap();
    table
        .put(&8u32.to_le_bytes(), &encode(&commodity(8, "Tea")).unwrap())
        .unwrap();

    let mut loaded = 0;
    let aborted = {
        let mut loader = TypedLoader::schema(|_: CommodityMessage| {
            loaded += 1;
            Ok(())
        });
        table
            .load_data(&mut loader, &ErrorFilter::default())
            .unwrap_err()
    };
    assert_eq!(aborted.source.kind(), ErrorKind::Malformed);
    assert_eq!(aborted.completed, 0);
    assert_eq!(loaded, 0);
    assert_eq!(table.count(), 1);
}

#[test]
fn test_tables_are_independent_directories() {
    let temp = TempDir::new().unwrap();
    let database = Database::open(temp.path()).unwrap();
    seed(&database);

    assert_eq!(database.systems().unwrap().count(), 0);
    assert!(database.root().join("commodities").is_dir());

    let table = Table::new(
        "commodities",
        LogStore::open(database.root().join("commodities")).unwrap(),
    );
    let tea: CommodityMessage = table.get_message(1).unwrap().unwrap();
    assert_eq!(tea.name, "Tea");
}
