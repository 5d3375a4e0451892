use abook_database::*;

const NOTES_V1: &str = "
    DEFINE TABLE note SCHEMAFULL;
    DEFINE FIELD body ON note TYPE string;
";

async fn memory_db() -> Database {
    Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .init()
        .await
        .expect("connect to mem://")
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = memory_db().await;

    db.health().await.expect("health check");
    assert_eq!(db.namespace(), "test_ns");
    assert_eq!(db.database(), "test_db");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));

    let err = Database::builder().url("mem://").init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn builder_applies_migrations() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .migrations([Migration::new("notes", "0001", NOTES_V1)])
        .init()
        .await
        .expect("connect with migrations");

    db.query("CREATE note CONTENT { body: 'hello' }")
        .await
        .expect("send")
        .check()
        .expect("note table is defined");
}

#[tokio::test]
async fn applied_migrations_are_skipped() {
    let db = memory_db().await;
    let migrations = [Migration::new("notes", "0001", NOTES_V1)];

    let first = db.apply_migrations(&migrations).await.expect("first run");
    assert_eq!(first.applied.len(), 1);
    assert!(first.skipped.is_empty());

    let second = db.apply_migrations(&migrations).await.expect("second run");
    assert!(second.applied.is_empty());
    assert_eq!(second.skipped.len(), 1);
    assert_eq!(second.skipped[0].checksum, migrations[0].checksum());
}

#[tokio::test]
async fn edited_migration_is_rejected() {
    let db = memory_db().await;
    db.apply_migrations(&[Migration::new("notes", "0001", NOTES_V1)]).await.expect("first run");

    let edited = Migration::new("notes", "0001", "DEFINE TABLE note SCHEMALESS;");
    let err = db.apply_migrations(&[edited]).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Migration { .. }));
}

#[tokio::test]
async fn failing_script_is_not_recorded() {
    let db = memory_db().await;
    let broken = Migration::new("notes", "0001", "THIS IS NOT SURREALQL;");
    assert!(db.apply_migrations(&[broken]).await.is_err());

    let report = db
        .apply_migrations(&[Migration::new("notes", "0001", NOTES_V1)])
        .await
        .expect("fixed script applies");
    assert_eq!(report.applied.len(), 1);
}
