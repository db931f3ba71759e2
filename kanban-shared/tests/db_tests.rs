/// Pool and migration tests against a live PostgreSQL
///
/// Run with: cargo test -p kanban-shared --test db_tests -- --ignored

mod common;

use kanban_shared::db::migrations::{run_migrations, schema_version};
use kanban_shared::db::pool::{close_pool, create_pool, health_check, DatabaseConfig};

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_migrations_are_idempotent() {
    let pool = common::migrated_pool().await;
    let version = schema_version(&pool).await.unwrap();
    assert!(version.is_some());

    run_migrations(&pool).await.expect("Second run failed");
    assert_eq!(schema_version(&pool).await.unwrap(), version);

    close_pool(pool).await;
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_migration_creates_all_tables() {
    let pool = common::migrated_pool().await;

    for table in [
        "users",
        "boards",
        "board_members",
        "columns",
        "cards",
        "comments",
        "checklist_fields",
        "attachments",
        "card_assignees",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_schema = 'public' AND table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "table {} missing", table);
    }

    let roles: Vec<String> = sqlx::query_scalar(
        "SELECT unnest(enum_range(NULL::board_role))::text",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(roles, vec!["viewer", "editor", "editor_chief", "admin"]);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_health_check() {
    let pool = create_pool(DatabaseConfig {
        url: common::test_database_url(),
        ..Default::default()
    })
    .await
    .unwrap();

    health_check(&pool).await.unwrap();
}

#[tokio::test]
async fn test_create_pool_with_invalid_url() {
    let result = create_pool(DatabaseConfig {
        url: "not-a-postgres-url".to_string(),
        acquire_timeout_seconds: 1,
        ..Default::default()
    })
    .await;

    assert!(result.is_err());
}
