/// Integration tests for database migrations
///
/// These tests require a running PostgreSQL database.
/// Run with: cargo test --test db_migrations_tests -- --ignored

mod common;

use familyhub_shared::db::migrations::{get_migration_status, latest_embedded_version, run_migrations};
use familyhub_shared::db::pool::close_pool;

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_migrations_are_idempotent() {
    let pool = common::setup_pool().await;

    let result = run_migrations(&pool).await;
    assert!(result.is_ok(), "Second run failed: {:?}", result.err());

    let status = get_migration_status(&pool)
        .await
        .expect("Failed to get migration status");
    assert!(status.applied_migrations > 0, "No migrations were applied");
    assert_eq!(status.latest_version, latest_embedded_version());
    assert!(status.is_up_to_date);

    close_pool(pool).await;
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_migration_creates_all_tables() {
    let pool = common::setup_pool().await;

    let expected_tables = [
        "users",
        "families",
        "family_memberships",
        "labels",
        "tasks",
        "task_labels",
    ];

    for table_name in expected_tables {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public'
                AND table_name = $1
            )",
        )
        .bind(table_name)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|_| panic!("Failed to check for table {}", table_name));

        assert!(exists, "Table '{}' should exist after migrations", table_name);
    }

    close_pool(pool).await;
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_migration_creates_enums() {
    let pool = common::setup_pool().await;

    for type_name in ["membership_role", "task_type"] {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_type WHERE typname = $1)")
            .bind(type_name)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(exists, "Enum '{}' should exist", type_name);
    }

    close_pool(pool).await;
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_parent_self_reference_rejected() {
    let pool = common::setup_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let owner = common::create_user(&mut conn, "Owner").await;
    let family = common::create_family(&mut conn, &owner, "Check Family").await;

    let task_id: i64 = sqlx::query_scalar("INSERT INTO tasks (family_id, title) VALUES ($1, 'x') RETURNING id")
        .bind(family.id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();

    let result = sqlx::query("UPDATE tasks SET parent_task_id = id WHERE id = $1")
        .bind(task_id)
        .execute(&mut *conn)
        .await;
    assert!(result.is_err(), "A task must not be its own parent");

    drop(conn);
    close_pool(pool).await;
}
