use super::*;
use dbv_db::DuckDbBackend;

fn setup() -> (Arc<DuckDbBackend>, SqlVersionStore) {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let store = SqlVersionStore::new(db.clone(), TableName::default());
    (db, store)
}

async fn row(db: &DuckDbBackend, table: &str) -> (String, String, String) {
    let select = |column: &str| format!("SELECT {column} FROM {table}");
    (
        db.query_one(&select("id")).await.unwrap().unwrap(),
        db.query_one(&select("version")).await.unwrap().unwrap(),
        db.query_one(&select("running")).await.unwrap().unwrap(),
    )
}

#[tokio::test]
async fn test_bootstrap_creates_singleton_row() {
    let (db, store) = setup();
    store.ensure_table().await.unwrap();

    let columns: Vec<String> = db
        .get_table_schema("db_version")
        .await
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(columns, vec!["id", "version", "running"]);
    assert_eq!(
        row(&db, "db_version").await,
        ("1".to_string(), "0".to_string(), "0".to_string())
    );
    assert_eq!(
        db.query_one("SELECT COUNT(*) FROM db_version")
            .await
            .unwrap()
            .as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_bootstrap_sets_table_comment() {
    let (db, store) = setup();
    store.ensure_table().await.unwrap();

    let comment = db
        .query_one("SELECT comment FROM duckdb_tables() WHERE table_name = 'db_version'")
        .await
        .unwrap();
    assert_eq!(comment.as_deref(), Some(TABLE_COMMENT));
}

#[tokio::test]
async fn test_bootstrap_is_idempotent_and_keeps_values() {
    let (db, store) = setup();
    store.ensure_table().await.unwrap();
    store.record_version(7).await.unwrap();

    store.ensure_table().await.unwrap();
    assert_eq!(store.current_version().await.unwrap(), 7);
    assert_eq!(
        db.query_one("SELECT COUNT(*) FROM db_version")
            .await
            .unwrap()
            .as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_legacy_table_is_upgraded() {
    let (db, store) = setup();
    db.execute_batch(
        "CREATE TABLE db_version (version INTEGER, running INTEGER);\
         INSERT INTO db_version VALUES (5, 0);",
    )
    .await
    .unwrap();

    store.ensure_table().await.unwrap();

    let columns: Vec<String> = db
        .get_table_schema("db_version")
        .await
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(columns, vec!["version", "running", "id"]);
    assert_eq!(
        row(&db, "db_version").await,
        ("1".to_string(), "5".to_string(), "0".to_string())
    );
    assert_eq!(store.current_version().await.unwrap(), 5);

    // The id column is now a key: a second row with id = 1 is rejected.
    let duplicate = db
        .execute("INSERT INTO db_version (version, running, id) VALUES (9, 0, 1)")
        .await;
    assert!(duplicate.is_err());

    // Running the bootstrap again leaves the upgraded table alone.
    store.ensure_table().await.unwrap();
    assert_eq!(store.current_version().await.unwrap(), 5);
}

#[tokio::test]
async fn test_lock_is_exclusive() {
    let (_db, store) = setup();
    store.ensure_table().await.unwrap();

    assert!(store.try_acquire().await.unwrap());
    assert!(!store.try_acquire().await.unwrap());
    assert!(store.status().await.unwrap().running);

    store.release().await.unwrap();
    assert!(!store.status().await.unwrap().running);
    assert!(store.try_acquire().await.unwrap());
}

#[tokio::test]
async fn test_release_is_unconditional() {
    let (_db, store) = setup();
    store.ensure_table().await.unwrap();

    store.release().await.unwrap();
    assert!(!store.status().await.unwrap().running);
}

#[tokio::test]
async fn test_record_and_read_version() {
    let (_db, store) = setup();
    store.ensure_table().await.unwrap();
    assert_eq!(store.current_version().await.unwrap(), 0);

    store.record_version(3).await.unwrap();
    assert_eq!(
        store.status().await.unwrap(),
        VersionStatus {
            version: 3,
            running: false
        }
    );
}

#[tokio::test]
async fn test_missing_row_is_corrupt() {
    let (db, store) = setup();
    store.ensure_table().await.unwrap();
    db.execute("DELETE FROM db_version").await.unwrap();

    let err = store.current_version().await.unwrap_err();
    assert!(matches!(err, MigrateError::CorruptVersionRow { .. }));
    assert!(err.to_string().contains("db_version"));
}

#[tokio::test]
async fn test_missing_table_is_database_error() {
    let (_db, store) = setup();
    let err = store.current_version().await.unwrap_err();
    assert!(matches!(err, MigrateError::Database(_)));
}

#[tokio::test]
async fn test_qualified_table_creates_schema() {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let table = TableName::try_new("ops.schema_version").unwrap();
    let store = SqlVersionStore::new(db.clone(), table);

    store.ensure_table().await.unwrap();
    assert!(db.relation_exists("ops.schema_version").await.unwrap());
    assert!(!db.relation_exists("db_version").await.unwrap());
    assert_eq!(store.table().as_ref(), "ops.schema_version");
    assert_eq!(store.current_version().await.unwrap(), 0);
}

#[tokio::test]
async fn test_tables_are_independent() {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let first = SqlVersionStore::new(db.clone(), TableName::try_new("first_version").unwrap());
    let second = SqlVersionStore::new(db.clone(), TableName::try_new("second_version").unwrap());
    first.ensure_table().await.unwrap();
    second.ensure_table().await.unwrap();

    first.record_version(4).await.unwrap();
    assert!(first.try_acquire().await.unwrap());

    assert_eq!(second.current_version().await.unwrap(), 0);
    assert!(second.try_acquire().await.unwrap());
}
