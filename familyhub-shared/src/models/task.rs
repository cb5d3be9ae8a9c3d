/// Task model and database operations
///
/// Tasks are family-scoped work items. A task is either `single` or `routine`;
/// routine tasks carry [`RoutineSettings`] and a derived
/// `next_occurrence_date`. Tasks form a tree through `parent_task_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_type AS ENUM ('single', 'routine');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     family_id BIGINT NOT NULL REFERENCES families(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     is_done BOOLEAN NOT NULL DEFAULT FALSE,
///     task_type task_type NOT NULL DEFAULT 'single',
///     due_date DATE,
///     next_occurrence_date DATE,
///     routine_settings JSONB,
///     assignee_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     notes TEXT,
///     priority INTEGER,
///     parent_task_id BIGINT REFERENCES tasks(id) ON DELETE SET NULL,
///     created_by_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     updated_by_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK (parent_task_id IS NULL OR parent_task_id <> id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::Utc;
/// use familyhub_shared::models::task::{CreateTask, Task};
/// use sqlx::PgConnection;
///
/// # async fn example(conn: &mut PgConnection, family_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
/// let input = CreateTask {
///     title: "Take out trash".to_string(),
///     ..Default::default()
/// };
/// let fields = input.to_fields(Utc::now().date_naive());
/// let task = Task::create(conn, family_id, &fields, user_id).await?;
/// assert!(!task.is_done);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgConnection;
use validator::{Validate, ValidationError};

use super::double_option;
use super::routine::{check_routine_settings, RoutineSettings};

const TASK_COLUMNS: &str = "id, family_id, title, is_done, task_type, due_date, \
     next_occurrence_date, routine_settings, assignee_id, notes, priority, parent_task_id, \
     created_by_id, updated_by_id, created_at, updated_at";

/// Task kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// One-off task
    Single,

    /// Recurring task driven by routine settings
    Routine,
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Single
    }
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Single => "single",
            TaskType::Routine => "routine",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub family_id: i64,
    pub title: String,
    pub is_done: bool,
    pub task_type: TaskType,
    pub due_date: Option<NaiveDate>,
    pub next_occurrence_date: Option<NaiveDate>,
    pub routine_settings: Option<Json<RoutineSettings>>,
    pub assignee_id: Option<i64>,
    pub notes: Option<String>,
    pub priority: Option<i32>,
    pub parent_task_id: Option<i64>,
    pub created_by_id: Option<i64>,
    pub updated_by_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable columns of a task, fully resolved
///
/// Both creation and partial updates are reduced to this shape before being
/// written, so `next_occurrence_date` is always derived from the final
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub notes: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub task_type: TaskType,
    pub routine_settings: Option<RoutineSettings>,
    pub is_done: bool,
    pub assignee_id: Option<i64>,
    pub parent_task_id: Option<i64>,
    pub next_occurrence_date: Option<NaiveDate>,
}

impl TaskFields {
    /// Recomputes `next_occurrence_date` from type, settings and due date
    ///
    /// Single tasks and routine tasks without settings have none. The anchor
    /// is the due date, or `today` when no due date is set.
    fn derive_next_occurrence(mut self, today: NaiveDate) -> Self {
        self.next_occurrence_date = match (&self.task_type, &self.routine_settings) {
            (TaskType::Routine, Some(settings)) => {
                settings.next_occurrence_on_or_after(self.due_date.unwrap_or(today))
            }
            _ => None,
        };
        self
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_task"))]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub priority: Option<i32>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub task_type: TaskType,

    #[serde(default)]
    pub routine_settings: Option<RoutineSettings>,

    #[serde(default)]
    pub is_done: bool,

    #[serde(default)]
    pub assignee_id: Option<i64>,

    #[serde(default)]
    pub parent_task_id: Option<i64>,

    /// Labels to attach; duplicates are ignored
    #[serde(default)]
    pub label_ids: Option<Vec<i64>>,
}

fn validate_create_task(data: &CreateTask) -> Result<(), ValidationError> {
    match &data.routine_settings {
        Some(settings) => check_routine_settings(settings),
        None => Ok(()),
    }
}

impl CreateTask {
    /// Resolves the input into the columns to insert
    pub fn to_fields(&self, today: NaiveDate) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            notes: self.notes.clone(),
            priority: self.priority,
            due_date: self.due_date,
            task_type: self.task_type,
            routine_settings: self.routine_settings.clone(),
            is_done: self.is_done,
            assignee_id: self.assignee_id,
            parent_task_id: self.parent_task_id,
            next_occurrence_date: None,
        }
        .derive_next_occurrence(today)
    }
}

/// Partial task update
///
/// Absent fields keep their current value. For nullable columns an explicit
/// `null` clears the value; for `title`, `task_type` and `is_done` a `null`
/// is treated as absent. `label_ids`, when present, replaces the whole set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_update_task"))]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub notes: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub priority: Option<Option<i32>>,

    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub due_date: Option<Option<NaiveDate>>,

    pub task_type: Option<TaskType>,

    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub routine_settings: Option<Option<RoutineSettings>>,

    pub is_done: Option<bool>,

    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub assignee_id: Option<Option<i64>>,

    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub parent_task_id: Option<Option<i64>>,

    pub label_ids: Option<Vec<i64>>,
}

fn validate_update_task(data: &UpdateTask) -> Result<(), ValidationError> {
    match &data.routine_settings {
        Some(Some(settings)) => check_routine_settings(settings),
        _ => Ok(()),
    }
}

impl UpdateTask {
    /// Overlays this update onto the current task
    pub fn merge_into(&self, task: &Task, today: NaiveDate) -> TaskFields {
        TaskFields {
            title: self.title.clone().unwrap_or_else(|| task.title.clone()),
            notes: self.notes.clone().unwrap_or_else(|| task.notes.clone()),
            priority: self.priority.unwrap_or(task.priority),
            due_date: self.due_date.unwrap_or(task.due_date),
            task_type: self.task_type.unwrap_or(task.task_type),
            routine_settings: self
                .routine_settings
                .clone()
                .unwrap_or_else(|| task.routine_settings.as_ref().map(|s| s.0.clone())),
            is_done: self.is_done.unwrap_or(task.is_done),
            assignee_id: self.assignee_id.unwrap_or(task.assignee_id),
            parent_task_id: self.parent_task_id.unwrap_or(task.parent_task_id),
            next_occurrence_date: None,
        }
        .derive_next_occurrence(today)
    }

    /// True when the update names an assignee different from the current one
    pub fn changes_assignee(&self, task: &Task) -> bool {
        matches!(self.assignee_id, Some(Some(id)) if task.assignee_id != Some(id))
    }

    /// True when the update names a parent different from the current one
    pub fn changes_parent(&self, task: &Task) -> bool {
        matches!(self.parent_task_id, Some(Some(id)) if task.parent_task_id != Some(id))
    }
}

impl Task {
    /// Inserts a task with creator = updater = `user_id`
    pub async fn create(
        conn: &mut PgConnection,
        family_id: i64,
        fields: &TaskFields,
        user_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO tasks (family_id, title, notes, priority, due_date, task_type, \
                 routine_settings, is_done, assignee_id, parent_task_id, next_occurrence_date, \
                 created_by_id, updated_by_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12) \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(family_id)
            .bind(&fields.title)
            .bind(&fields.notes)
            .bind(fields.priority)
            .bind(fields.due_date)
            .bind(fields.task_type)
            .bind(fields.routine_settings.clone().map(Json))
            .bind(fields.is_done)
            .bind(fields.assignee_id)
            .bind(fields.parent_task_id)
            .bind(fields.next_occurrence_date)
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to a family
    pub async fn find_in_family(
        conn: &mut PgConnection,
        task_id: i64,
        family_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND family_id = $2");

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(family_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(task)
    }

    /// Lists a page of a family's tasks in insertion order
    pub async fn list_by_family(
        conn: &mut PgConnection,
        family_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE family_id = $1 ORDER BY id LIMIT $2 OFFSET $3"
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(family_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await?;

        Ok(tasks)
    }

    /// Overwrites the writable columns and stamps the updater
    pub async fn update(
        conn: &mut PgConnection,
        task_id: i64,
        fields: &TaskFields,
        user_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "UPDATE tasks \
             SET title = $2, notes = $3, priority = $4, due_date = $5, task_type = $6, \
                 routine_settings = $7, is_done = $8, assignee_id = $9, parent_task_id = $10, \
                 next_occurrence_date = $11, updated_by_id = $12, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(&fields.title)
            .bind(&fields.notes)
            .bind(fields.priority)
            .bind(fields.due_date)
            .bind(fields.task_type)
            .bind(fields.routine_settings.clone().map(Json))
            .bind(fields.is_done)
            .bind(fields.assignee_id)
            .bind(fields.parent_task_id)
            .bind(fields.next_occurrence_date)
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Label associations are removed with it; subtasks are detached.
    pub async fn delete(conn: &mut PgConnection, task_id: i64, family_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND family_id = $2")
            .bind(task_id)
            .bind(family_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether `candidate` is `task_id` itself or one of its descendants
    ///
    /// Used to reject parent assignments that would close a cycle.
    pub async fn is_self_or_descendant(
        conn: &mut PgConnection,
        task_id: i64,
        candidate: i64,
    ) -> Result<bool, sqlx::Error> {
        let found: bool = sqlx::query_scalar(
            r#"
            WITH RECURSIVE subtree(id) AS (
                SELECT id FROM tasks WHERE id = $1
                UNION
                SELECT t.id FROM tasks t JOIN subtree s ON t.parent_task_id = s.id
            )
            SELECT EXISTS(SELECT 1 FROM subtree WHERE id = $2)
            "#,
        )
        .bind(task_id)
        .bind(candidate)
        .fetch_one(&mut *conn)
        .await?;

        Ok(found)
    }
}
