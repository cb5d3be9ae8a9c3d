/// Integration tests for the label service
///
/// These tests require a running PostgreSQL database.
/// Run with: cargo test --test label_service_tests -- --ignored

mod common;

use familyhub_shared::error::ServiceError;
use familyhub_shared::models::label::{CreateLabel, UpdateLabel};
use familyhub_shared::models::task::CreateTask;
use familyhub_shared::services::label::{
    create_label, delete_label, get_label, list_labels, update_label,
};
use familyhub_shared::services::task::{create_task, get_task};
use familyhub_shared::services::Pagination;

fn label(name: &str) -> CreateLabel {
    CreateLabel {
        name: name.to_string(),
        color: None,
    }
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_duplicate_label_name_conflicts() {
    let pool = common::setup_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let owner = common::create_user(&mut conn, "Owner").await;
    let family = common::create_family(&mut conn, &owner, "Label Family").await;
    let other_family = common::create_family(&mut conn, &owner, "Other Family").await;

    create_label(&mut conn, &label("Groceries"), family.id, &owner)
        .await
        .unwrap();

    let again = create_label(&mut conn, &label("Groceries"), family.id, &owner).await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));

    // Same name in another family is fine
    let elsewhere = create_label(&mut conn, &label("Groceries"), other_family.id, &owner).await;
    assert!(elsewhere.is_ok());
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_label_from_other_family_is_not_found() {
    let pool = common::setup_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let owner = common::create_user(&mut conn, "Owner").await;
    let family = common::create_family(&mut conn, &owner, "Home").await;
    let other_family = common::create_family(&mut conn, &owner, "Cabin").await;

    let foreign = create_label(&mut conn, &label("Firewood"), other_family.id, &owner)
        .await
        .unwrap();

    let result = get_label(&mut conn, foreign.id, family.id, &owner).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let found = get_label(&mut conn, foreign.id, other_family.id, &owner).await.unwrap();
    assert_eq!(found.name, "Firewood");
    assert_eq!(found.created_by_id, Some(owner.id));
    assert_eq!(found.updated_by_id, Some(owner.id));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_non_member_is_forbidden() {
    let pool = common::setup_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let owner = common::create_user(&mut conn, "Owner").await;
    let stranger = common::create_user(&mut conn, "Stranger").await;
    let family = common::create_family(&mut conn, &owner, "Private").await;

    let result = create_label(&mut conn, &label("Secret"), family.id, &stranger).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let result = list_labels(&mut conn, family.id, &stranger, Pagination::default()).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_list_labels_is_stable() {
    let pool = common::setup_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let owner = common::create_user(&mut conn, "Owner").await;
    let family = common::create_family(&mut conn, &owner, "Listing").await;

    for name in ["Chores", "School", "Garden", "Pets"] {
        create_label(&mut conn, &label(name), family.id, &owner)
            .await
            .unwrap();
    }

    let page = Pagination { skip: 1, limit: 2 };
    let first = list_labels(&mut conn, family.id, &owner, page).await.unwrap();
    let second = list_labels(&mut conn, family.id, &owner, page).await.unwrap();

    let names: Vec<&str> = first.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["School", "Garden"]);
    let ids_first: Vec<i64> = first.iter().map(|l| l.id).collect();
    let ids_second: Vec<i64> = second.iter().map(|l| l.id).collect();
    assert_eq!(ids_first, ids_second);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_update_label_rename_rules() {
    let pool = common::setup_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let owner = common::create_user(&mut conn, "Owner").await;
    let family = common::create_family(&mut conn, &owner, "Renames").await;

    let chores = create_label(
        &mut conn,
        &CreateLabel {
            name: "Chores".to_string(),
            color: Some("#FFDDC1".to_string()),
        },
        family.id,
        &owner,
    )
    .await
    .unwrap();
    create_label(&mut conn, &label("School"), family.id, &owner)
        .await
        .unwrap();

    // Renaming to its own name is not a conflict
    let same = UpdateLabel {
        name: Some("Chores".to_string()),
        color: None,
    };
    let updated = update_label(&mut conn, chores.id, &same, family.id, &owner)
        .await
        .unwrap();
    assert_eq!(updated.color.as_deref(), Some("#FFDDC1"));

    let onto_other = UpdateLabel {
        name: Some("School".to_string()),
        color: None,
    };
    let result = update_label(&mut conn, chores.id, &onto_other, family.id, &owner).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let clear_color = UpdateLabel {
        name: None,
        color: Some(None),
    };
    let cleared = update_label(&mut conn, chores.id, &clear_color, family.id, &owner)
        .await
        .unwrap();
    assert_eq!(cleared.name, "Chores");
    assert_eq!(cleared.color, None);

    let missing = update_label(&mut conn, -1, &same, family.id, &owner).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_delete_attached_label_detaches_it() {
    let pool = common::setup_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let owner = common::create_user(&mut conn, "Owner").await;
    let family = common::create_family(&mut conn, &owner, "Cleanup").await;

    let chores = create_label(&mut conn, &label("Chores"), family.id, &owner)
        .await
        .unwrap();
    let task = create_task(
        &mut conn,
        &CreateTask {
            title: "Mop floor".to_string(),
            label_ids: Some(vec![chores.id]),
            ..Default::default()
        },
        family.id,
        &owner,
    )
    .await
    .unwrap();
    assert_eq!(task.labels.len(), 1);

    delete_label(&mut conn, chores.id, family.id, &owner)
        .await
        .unwrap();

    let reloaded = get_task(&mut conn, task.task.id, family.id, &owner).await.unwrap();
    assert!(reloaded.labels.is_empty());

    let again = delete_label(&mut conn, chores.id, family.id, &owner).await;
    assert!(matches!(again, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_concurrent_label_create_conflicts_on_unique_index() {
    use familyhub_shared::db::session;
    use std::time::Duration;

    let pool = common::setup_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let owner = common::create_user(&mut conn, "Owner").await;
    let family = common::create_family(&mut conn, &owner, "Race Family").await;
    drop(conn);

    let mut first = session::begin(&pool).await.unwrap();
    create_label(&mut first, &label("Groceries"), family.id, &owner)
        .await
        .unwrap();

    // The second pre-check cannot see the uncommitted row, so its insert
    // waits on the unique index until the first transaction commits.
    let mut second = session::begin(&pool).await.unwrap();
    let family_id = family.id;
    let actor = owner.clone();
    let pending = tokio::spawn(async move {
        let result = create_label(&mut second, &label("Groceries"), family_id, &actor).await;
        drop(second);
        result
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    session::commit(first).await.unwrap();

    match pending.await.unwrap() {
        Err(ServiceError::Conflict(msg)) => {
            assert_eq!(msg, "Label name 'Groceries' already exists in this family.")
        }
        other => panic!("expected Conflict, got {:?}", other),
    }

    let mut conn = pool.acquire().await.unwrap();
    let labels = list_labels(&mut conn, family.id, &owner, Pagination::default())
        .await
        .unwrap();
    assert_eq!(labels.len(), 1);
}
