/// Task service
///
/// Creating or updating a task touches several tables: the task row, the
/// assignee check, the parent check and the label associations. Everything
/// runs on the caller's transaction, so a failing check after the task row
/// has been written still leaves nothing behind once the transaction is
/// dropped.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgConnection;
use tracing::{debug, info};

use crate::auth::authorization::require_family_membership;
use crate::auth::CurrentUser;
use crate::error::{ServiceError, ServiceResult};
use crate::models::label::Label;
use crate::models::membership::Membership;
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::task_label::TaskLabel;
use crate::models::user::User;
use crate::services::Pagination;

/// A task with its resolved assignee and labels
#[derive(Debug, Clone)]
pub struct TaskDetails {
    pub task: Task,
    pub assignee: Option<User>,
    /// Attached labels in ascending ID order
    pub labels: Vec<Label>,
}

fn task_not_found(task_id: i64, family_id: i64) -> ServiceError {
    ServiceError::NotFound(format!(
        "Task with ID {} not found in family {}",
        task_id, family_id
    ))
}

/// Loads the assignee and checks that they belong to the family
async fn resolve_assignee(
    conn: &mut PgConnection,
    assignee_id: i64,
    family_id: i64,
) -> ServiceResult<User> {
    let user = User::find_by_id(&mut *conn, assignee_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Assignee user with ID {} not found.", assignee_id))
        })?;

    if !Membership::is_member(&mut *conn, family_id, assignee_id).await? {
        return Err(ServiceError::Unprocessable(format!(
            "Assignee user {} is not a member of family {}.",
            assignee_id, family_id
        )));
    }

    Ok(user)
}

/// Loads the requested labels, all of which must belong to the family
///
/// Duplicate IDs are collapsed. Missing or foreign IDs are reported together,
/// in ascending order.
async fn resolve_labels(
    conn: &mut PgConnection,
    family_id: i64,
    label_ids: &[i64],
) -> ServiceResult<Vec<Label>> {
    let mut wanted = label_ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    let labels = Label::find_many_in_family(&mut *conn, family_id, &wanted).await?;

    if labels.len() != wanted.len() {
        let missing: Vec<i64> = wanted
            .iter()
            .copied()
            .filter(|id| !labels.iter().any(|l| l.id == *id))
            .collect();
        return Err(ServiceError::NotFound(format!(
            "Labels not found or do not belong to family {}: {:?}",
            family_id, missing
        )));
    }

    Ok(labels)
}

async fn ensure_parent_in_family(
    conn: &mut PgConnection,
    parent_id: i64,
    family_id: i64,
) -> ServiceResult<()> {
    if Task::find_in_family(&mut *conn, parent_id, family_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Parent task with ID {} not found in family {}",
            parent_id, family_id
        )));
    }
    Ok(())
}

/// Resolves assignee and labels for a task already loaded
async fn load_details(conn: &mut PgConnection, task: Task) -> ServiceResult<TaskDetails> {
    let assignee = match task.assignee_id {
        Some(id) => User::find_by_id(&mut *conn, id).await?,
        None => None,
    };

    let labels = TaskLabel::labels_for_tasks(&mut *conn, &[task.id])
        .await?
        .into_iter()
        .map(|row| row.into_parts().1)
        .collect();

    Ok(TaskDetails {
        task,
        assignee,
        labels,
    })
}

/// Creates a task with its assignee and labels
///
/// # Errors
///
/// - `ServiceError::NotFound` / `ServiceError::Forbidden` from the membership check
/// - `ServiceError::NotFound` if the parent task, the assignee or any label is missing
/// - `ServiceError::Unprocessable` if the assignee is not a family member
pub async fn create_task(
    conn: &mut PgConnection,
    data: &CreateTask,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<TaskDetails> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    if let Some(parent_id) = data.parent_task_id {
        ensure_parent_in_family(&mut *conn, parent_id, family_id).await?;
    }

    let assignee = match data.assignee_id {
        Some(id) => Some(resolve_assignee(&mut *conn, id, family_id).await?),
        None => None,
    };

    let fields = data.to_fields(Utc::now().date_naive());
    let task = Task::create(&mut *conn, family_id, &fields, user.id).await?;
    debug!(task_id = task.id, family_id, "Base task staged");

    let labels = match &data.label_ids {
        Some(ids) => {
            let labels = resolve_labels(&mut *conn, family_id, ids).await?;
            let ids: Vec<i64> = labels.iter().map(|l| l.id).collect();
            TaskLabel::attach(&mut *conn, task.id, &ids).await?;
            labels
        }
        None => Vec::new(),
    };

    info!(
        task_id = task.id,
        family_id,
        user_id = user.id,
        task_type = task.task_type.as_str(),
        label_count = labels.len(),
        "Task created"
    );

    Ok(TaskDetails {
        task,
        assignee,
        labels,
    })
}

/// Fetches one task with its assignee and labels
pub async fn get_task(
    conn: &mut PgConnection,
    task_id: i64,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<TaskDetails> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    let task = Task::find_in_family(&mut *conn, task_id, family_id)
        .await?
        .ok_or_else(|| task_not_found(task_id, family_id))?;

    load_details(&mut *conn, task).await
}

/// Lists a page of tasks with assignees and labels
///
/// Assignees and labels are loaded with one query each for the whole page.
pub async fn list_tasks(
    conn: &mut PgConnection,
    family_id: i64,
    user: &CurrentUser,
    page: Pagination,
) -> ServiceResult<Vec<TaskDetails>> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    let tasks = Task::list_by_family(&mut *conn, family_id, page.limit, page.skip).await?;

    let mut assignee_ids: Vec<i64> = tasks.iter().filter_map(|t| t.assignee_id).collect();
    assignee_ids.sort_unstable();
    assignee_ids.dedup();
    let users: HashMap<i64, User> = User::find_many(&mut *conn, &assignee_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let mut labels_by_task: HashMap<i64, Vec<Label>> = HashMap::new();
    for row in TaskLabel::labels_for_tasks(&mut *conn, &task_ids).await? {
        let (task_id, label) = row.into_parts();
        labels_by_task.entry(task_id).or_default().push(label);
    }

    let details = tasks
        .into_iter()
        .map(|task| TaskDetails {
            assignee: task.assignee_id.and_then(|id| users.get(&id).cloned()),
            labels: labels_by_task.remove(&task.id).unwrap_or_default(),
            task,
        })
        .collect();

    Ok(details)
}

/// Applies a partial update to a task
///
/// # Errors
///
/// - `ServiceError::NotFound` if the task, a new parent, a new assignee or a label is missing
/// - `ServiceError::Unprocessable` if the new assignee is not a member, or the
///   new parent is the task itself or one of its descendants
pub async fn update_task(
    conn: &mut PgConnection,
    task_id: i64,
    data: &UpdateTask,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<TaskDetails> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    let current = Task::find_in_family(&mut *conn, task_id, family_id)
        .await?
        .ok_or_else(|| task_not_found(task_id, family_id))?;

    if data.changes_assignee(&current) {
        if let Some(Some(assignee_id)) = data.assignee_id {
            resolve_assignee(&mut *conn, assignee_id, family_id).await?;
        }
    }

    if data.changes_parent(&current) {
        if let Some(Some(parent_id)) = data.parent_task_id {
            ensure_parent_in_family(&mut *conn, parent_id, family_id).await?;
            if Task::is_self_or_descendant(&mut *conn, task_id, parent_id).await? {
                return Err(ServiceError::Unprocessable(format!(
                    "Task {} cannot be moved under itself or one of its subtasks.",
                    task_id
                )));
            }
        }
    }

    if let Some(ids) = &data.label_ids {
        let labels = resolve_labels(&mut *conn, family_id, ids).await?;
        let ids: Vec<i64> = labels.iter().map(|l| l.id).collect();
        TaskLabel::detach_all(&mut *conn, task_id).await?;
        TaskLabel::attach(&mut *conn, task_id, &ids).await?;
    }

    let fields = data.merge_into(&current, Utc::now().date_naive());
    let task = Task::update(&mut *conn, task_id, &fields, user.id).await?;

    info!(task_id, family_id, user_id = user.id, "Task updated");
    load_details(&mut *conn, task).await
}

/// Deletes a task; its subtasks are detached, not deleted
pub async fn delete_task(
    conn: &mut PgConnection,
    task_id: i64,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<()> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    if !Task::delete(&mut *conn, task_id, family_id).await? {
        return Err(task_not_found(task_id, family_id));
    }

    info!(task_id, family_id, user_id = user.id, "Task deleted");
    Ok(())
}

// Database-backed tests live in tests/task_service_tests.rs
