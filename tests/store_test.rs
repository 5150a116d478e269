//! Tests for the tabular store backends

use salon_ops::error::SalonOpsError;
use salon_ops::store::{CellRange, MemoryStore, SqliteStore, TabularStore};

const HEADER: [&str; 4] = ["id", "nombre", "precio", "activo"];

async fn seed_three_rows(store: &dyn TabularStore) {
    let table = store
        .get_or_create_table("servicios", &HEADER)
        .await
        .expect("create table");
    for (id, name) in [(1, "Manicura"), (2, "Pedicura"), (3, "Laminado")] {
        store
            .append(
                &table,
                &[id.to_string(), name.to_string(), "25".to_string(), "1".to_string()],
            )
            .await
            .expect("append row");
    }
}

#[tokio::test]
async fn test_append_then_read_preserves_order() {
    let store = MemoryStore::new();
    seed_three_rows(&store).await;

    let table = store.get_or_create_table("servicios", &HEADER).await.expect("table");
    let rows = store.read_all(&table).await.expect("read");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].text("nombre"), "Manicura");
    assert_eq!(rows[2].text("nombre"), "Laminado");
    assert_eq!(rows[1].int("id"), Some(2));
}

#[tokio::test]
async fn test_get_or_create_keeps_existing_header() {
    let store = MemoryStore::new();
    store.get_or_create_table("tabla", &["id", "nombre"]).await.expect("create");

    // a second caller with a different header gets the original one back
    let table = store
        .get_or_create_table("tabla", &["id", "otra", "cosa"])
        .await
        .expect("reopen");
    assert_eq!(table.header, vec!["id".to_string(), "nombre".to_string()]);
}

#[tokio::test]
async fn test_append_pads_short_rows_and_rejects_long_ones() {
    let store = MemoryStore::new();
    let table = store.get_or_create_table("tabla", &HEADER).await.expect("create");

    store
        .append(&table, &["1".to_string(), "Corto".to_string()])
        .await
        .expect("short row is padded");
    let rows = store.read_all(&table).await.expect("read");
    assert_eq!(rows[0].text("activo"), "");

    let too_long: Vec<String> = (0..5).map(|i| i.to_string()).collect();
    assert!(store.append(&table, &too_long).await.is_err());
}

#[tokio::test]
async fn test_update_range_overwrites_span() {
    let store = MemoryStore::new();
    seed_three_rows(&store).await;
    let table = store.get_or_create_table("servicios", &HEADER).await.expect("table");

    // data row 2 is physical row 3; overwrite B..C
    let range = CellRange::span(3, 2, 3);
    store
        .update_range(&table, &range, &["Pedicura Spa".to_string(), "30".to_string()])
        .await
        .expect("update");

    let rows = store.read_all(&table).await.expect("read");
    assert_eq!(rows[1].text("nombre"), "Pedicura Spa");
    assert_eq!(rows[1].float("precio"), Some(30.0));
    // neighbours untouched
    assert_eq!(rows[0].text("nombre"), "Manicura");
    assert_eq!(rows[1].text("activo"), "1");
}

#[tokio::test]
async fn test_update_range_rejects_mismatched_values() {
    let store = MemoryStore::new();
    seed_three_rows(&store).await;
    let table = store.get_or_create_table("servicios", &HEADER).await.expect("table");

    let range = CellRange::span(2, 2, 3);
    let result = store.update_range(&table, &range, &["solo uno".to_string()]).await;
    assert!(matches!(result, Err(SalonOpsError::InvalidRange(_))));

    // header row is off limits
    let header_range = CellRange::single(1, 1);
    let result = store.update_range(&table, &header_range, &["x".to_string()]).await;
    assert!(matches!(result, Err(SalonOpsError::InvalidRange(_))));
}

#[tokio::test]
async fn test_delete_row_index_math() {
    let store = MemoryStore::new();
    seed_three_rows(&store).await;
    let table = store.get_or_create_table("servicios", &HEADER).await.expect("table");

    // physical row 3 is the second data row
    store.delete_row(&table, 3).await.expect("delete");

    let rows = store.read_all(&table).await.expect("read");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].text("nombre"), "Manicura");
    assert_eq!(rows[1].text("nombre"), "Laminado");

    assert!(store.delete_row(&table, 1).await.is_err());
    assert!(store.delete_row(&table, 99).await.is_err());
}

#[tokio::test]
async fn test_sqlite_store_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("store.db");
    let store = SqliteStore::open(path.to_str().expect("utf-8 path")).expect("open store");

    seed_three_rows(&store).await;
    let table = store.get_or_create_table("servicios", &HEADER).await.expect("table");

    let rows = store.read_all(&table).await.expect("read");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].text("nombre"), "Manicura");

    let range = CellRange::single(2, 4);
    store.update_range(&table, &range, &["0".to_string()]).await.expect("update");
    store.delete_row(&table, 4).await.expect("delete");

    let rows = store.read_all(&table).await.expect("read");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].int("activo"), Some(0));
    assert_eq!(rows[1].text("nombre"), "Pedicura");

    // header survives a reopen with a different requested header
    let reopened = store
        .get_or_create_table("servicios", &["id", "algo"])
        .await
        .expect("reopen");
    assert_eq!(reopened.header.len(), HEADER.len());
}
