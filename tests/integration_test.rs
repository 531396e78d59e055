//! Integration tests for the seeded store
//!
//! Seeds real SQLite files in temporary directories and checks what the
//! agent will see through the read-only handle.

use sql_chat::database::{bootstrap, seed, Database};
use sql_chat::error::SqlChatError;

#[tokio::test]
async fn test_suppliers_seeded_with_fixed_values() {
    let dir = tempfile::tempdir().unwrap();
    let (_, db) = bootstrap(&dir.path().join("store.db")).await.unwrap();

    let result = db
        .run("SELECT SUPPLIER_ID, NAME, ADDRESS, CONTACT FROM SUPPLIERS ORDER BY SUPPLIER_ID")
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 5);

    let ids: Vec<&str> = (0..5).map(|i| result.value(i, "supplier_id").unwrap()).collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5"]);

    assert_eq!(result.value(0, "NAME"), Some("Samsung Electronics"));
    assert_eq!(result.value(1, "ADDRESS"), Some("Cupertino, California, USA"));
    assert_eq!(result.value(1, "CONTACT"), Some("800–692–7753"));
    assert_eq!(result.value(4, "NAME"), Some("Xiaomi Corporation"));
}

#[tokio::test]
async fn test_references_stay_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let (_, db) = bootstrap(&dir.path().join("store.db")).await.unwrap();

    let bad_products = db
        .run("SELECT COUNT(*) AS n FROM PRODUCTS WHERE SUPPLIER_ID NOT BETWEEN 1 AND 5")
        .await
        .unwrap();
    assert_eq!(bad_products.value(0, "n"), Some("0"));

    let bad_inventory = db
        .run("SELECT COUNT(*) AS n FROM INVENTORY WHERE PRODUCT_ID NOT BETWEEN 1 AND 10")
        .await
        .unwrap();
    assert_eq!(bad_inventory.value(0, "n"), Some("0"));

    let orphans = db
        .run(
            "SELECT COUNT(*) AS n FROM INVENTORY i LEFT JOIN PRODUCTS p ON p.PRODUCT_ID = i.PRODUCT_ID \
             WHERE p.PRODUCT_ID IS NULL",
        )
        .await
        .unwrap();
    assert_eq!(orphans.value(0, "n"), Some("0"));
}

#[tokio::test]
async fn test_reseeding_yields_identical_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    let snapshot = "SELECT p.PRODUCT_ID, p.NAME, p.PRICE, s.NAME, i.QUANTITY, i.MIN_REQUIRED \
                    FROM PRODUCTS p JOIN SUPPLIERS s USING (SUPPLIER_ID) \
                    JOIN INVENTORY i USING (PRODUCT_ID) ORDER BY p.PRODUCT_ID";

    let first = seed(&path).await.unwrap();
    assert!(!first.removed_previous);
    let before = Database::open(&path).await.unwrap().run(snapshot).await.unwrap();

    let second = seed(&path).await.unwrap();
    assert!(second.removed_previous);
    assert_eq!(
        second.removal_message(&path),
        "File 'store.db' found and deleted."
    );
    let after = Database::open(&path).await.unwrap().run(snapshot).await.unwrap();

    assert_eq!(before, after);
    assert_eq!(after.rows.len(), 10);
}

#[tokio::test]
async fn test_store_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let (_, db) = bootstrap(&dir.path().join("store.db")).await.unwrap();

    let err = db
        .run("DELETE FROM INVENTORY")
        .await
        .unwrap_err();
    assert!(matches!(err, SqlChatError::Query { .. }));

    let still_there = db.run("SELECT COUNT(*) AS n FROM INVENTORY").await.unwrap();
    assert_eq!(still_there.value(0, "n"), Some("10"));
}

#[tokio::test]
async fn test_question_scenarios_as_sql() {
    let dir = tempfile::tempdir().unwrap();
    let (_, db) = bootstrap(&dir.path().join("store.db")).await.unwrap();

    let count = db.run("SELECT COUNT(*) FROM SUPPLIERS").await.unwrap();
    assert_eq!(count.rows, vec![vec!["5".to_string()]]);

    let price = db
        .run("SELECT PRICE FROM PRODUCTS WHERE NAME = 'iPhone SE'")
        .await
        .unwrap();
    assert_eq!(price.value(0, "PRICE"), Some("399.99"));

    let none = db
        .run("SELECT NAME FROM PRODUCTS WHERE PRICE > 5000")
        .await
        .unwrap();
    assert!(none.is_empty());
    assert_eq!(none.to_table(), "Query returned no rows.");
}

#[test]
fn test_schema_index_over_seeded_store() {
    tokio_test::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let (_, db) = bootstrap(&dir.path().join("store.db")).await.unwrap();

        let index = db.index().await.unwrap();
        assert_eq!(index.table_names(), vec!["INVENTORY", "PRODUCTS", "SUPPLIERS"]);

        let products = index.get_table("PRODUCTS").unwrap();
        assert_eq!(products.primary_keys, vec!["PRODUCT_ID".to_string()]);
        assert!(products.get_column("SUPPLIER_ID").unwrap().is_foreign_key());

        let summary = index.format_summary_for_llm();
        assert!(summary.contains("SUPPLIERS"));
        assert!(summary.contains("MIN_REQUIRED"));
    });
}
