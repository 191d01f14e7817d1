use super::*;
use crate::batch::ConnectionBatchRunner;
use crate::error::BoxError;
use crate::procedure::ProcedureRegistry;
use crate::source::DirectorySource;
use dbv_db::DuckDbBackend;
use std::path::Path;

fn write(dir: &Path, name: &str, sql: &str) {
    std::fs::write(dir.join(name), sql).unwrap();
}

fn migrator(db: &Arc<DuckDbBackend>, source: Arc<dyn ScriptSource>) -> Migrator {
    Migrator::new(
        db.clone(),
        source,
        Arc::new(ConnectionBatchRunner::new(db.clone())),
    )
    .with_poll_interval(Duration::from_millis(5))
}

#[tokio::test]
async fn test_migrate_reports_applied_versions() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "1.sql", "CREATE TABLE users (id INT);");
    write(dir.path(), "2.sql", "ALTER TABLE users ADD COLUMN name VARCHAR;");
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());

    let report = migrator(&db, Arc::new(DirectorySource::new(dir.path())))
        .migrate()
        .await
        .unwrap();

    assert_eq!(
        report,
        MigrationReport {
            from_version: 0,
            to_version: 2,
            applied: vec![1, 2],
        }
    );
    assert!(!report.is_up_to_date());
    let columns = db.get_table_schema("users").await.unwrap();
    assert_eq!(columns.len(), 2);
}

#[tokio::test]
async fn test_lock_released_after_success() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "1.sql", "CREATE TABLE t (id INT);");
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let migrator = migrator(&db, Arc::new(DirectorySource::new(dir.path())));

    migrator.migrate().await.unwrap();
    assert_eq!(
        migrator.status().await.unwrap(),
        VersionStatus {
            version: 1,
            running: false
        }
    );
}

#[tokio::test]
async fn test_lock_released_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "1.sql", "CREATE TABLE t (id INT);");
    write(dir.path(), "2.sql", "INSERT INTO missing VALUES (1);");
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let migrator = migrator(&db, Arc::new(DirectorySource::new(dir.path())));

    let err = migrator.migrate().await.unwrap_err();
    assert!(matches!(err, MigrateError::BatchFailed { version: 2, .. }));

    let status = migrator.status().await.unwrap();
    assert_eq!(status.version, 1);
    assert!(!status.running);
}

#[tokio::test]
async fn test_panicking_procedure_releases_lock() {
    let mut procedures = ProcedureRegistry::new();
    procedures
        .register_fn(1, |_db| {
            async {
                if true {
                    panic!("procedure exploded");
                }
                Ok::<(), BoxError>(())
            }
            .boxed()
        })
        .unwrap();
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let migrator = migrator(&db, Arc::new(procedures));

    match migrator.migrate().await.unwrap_err() {
        MigrateError::Panicked { message } => assert_eq!(message, "procedure exploded"),
        other => panic!("expected panic error, got {other:?}"),
    }
    let status = migrator.status().await.unwrap();
    assert_eq!(status.version, 0);
    assert!(!status.running);
}

#[tokio::test]
async fn test_second_run_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "1.sql", "CREATE TABLE t (id INT);");
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let migrator = migrator(&db, Arc::new(DirectorySource::new(dir.path())));

    migrator.migrate().await.unwrap();
    let report = migrator.migrate().await.unwrap();
    assert!(report.is_up_to_date());
    assert_eq!(report.from_version, 1);
    assert_eq!(report.to_version, 1);
}

#[tokio::test]
async fn test_pending_walks_contiguous_versions() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "1.sql", "CREATE TABLE t (id INT);");
    write(dir.path(), "2.sql", "SELECT 1;");
    write(dir.path(), "3.sql", "SELECT 1;");
    write(dir.path(), "5.sql", "SELECT 1;");
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let migrator = migrator(&db, Arc::new(DirectorySource::new(dir.path())));

    assert_eq!(migrator.pending().await.unwrap(), vec![1, 2, 3]);
    // Nothing was executed.
    assert!(!db.relation_exists("t").await.unwrap());
    assert_eq!(migrator.status().await.unwrap().version, 0);
}

#[tokio::test]
async fn test_pending_with_unreadable_source_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let migrator = migrator(&db, Arc::new(DirectorySource::new(dir.path().join("gone"))));

    assert!(migrator.pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_force_unlock_clears_stranded_lock() {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let store = Arc::new(SqlVersionStore::new(db.clone(), TableName::default()));
    store.ensure_table().await.unwrap();
    assert!(store.try_acquire().await.unwrap());

    let migrator = migrator(&db, Arc::new(ProcedureRegistry::new())).with_store(store.clone());
    assert!(migrator.status().await.unwrap().running);

    migrator.force_unlock().await.unwrap();
    assert!(!migrator.status().await.unwrap().running);
    migrator.migrate().await.unwrap();
}

#[tokio::test]
async fn test_custom_table_name() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "1.sql", "CREATE TABLE t (id INT);");
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let migrator = migrator(&db, Arc::new(DirectorySource::new(dir.path())))
        .with_table(TableName::try_new("app_schema_version").unwrap());

    migrator.migrate().await.unwrap();
    assert!(db.relation_exists("app_schema_version").await.unwrap());
    assert!(!db.relation_exists("db_version").await.unwrap());
}

#[test]
fn test_panic_message_payloads() {
    let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
    let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
    let other: Box<dyn Any + Send> = Box::new(42_u8);

    assert_eq!(panic_message(owned.as_ref()), "owned");
    assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
    assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
}
