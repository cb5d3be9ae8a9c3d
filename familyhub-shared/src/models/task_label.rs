/// Task-label association
///
/// Pure join rows with no lifecycle of their own: they are written when a
/// task's label set is set and disappear with either side.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_labels (
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     label_id BIGINT NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
///     PRIMARY KEY (task_id, label_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use super::label::Label;

/// Join row between a task and a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskLabel {
    pub task_id: i64,
    pub label_id: i64,
}

/// A label together with the task it is attached to
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskLabelRow {
    pub task_id: i64,
    pub id: i64,
    pub family_id: i64,
    pub name: String,
    pub color: Option<String>,
    pub created_by_id: Option<i64>,
    pub updated_by_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskLabelRow {
    /// Splits the row into its task ID and label
    pub fn into_parts(self) -> (i64, Label) {
        (
            self.task_id,
            Label {
                id: self.id,
                family_id: self.family_id,
                name: self.name,
                color: self.color,
                created_by_id: self.created_by_id,
                updated_by_id: self.updated_by_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        )
    }
}

impl TaskLabel {
    /// Attaches labels to a task, one row per label
    pub async fn attach(conn: &mut PgConnection, task_id: i64, label_ids: &[i64]) -> Result<(), sqlx::Error> {
        if label_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO task_labels (task_id, label_id)
            SELECT $1, label_id FROM UNNEST($2::BIGINT[]) AS label_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(label_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Removes every label from a task
    pub async fn detach_all(conn: &mut PgConnection, task_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Loads the labels of several tasks in one query, ordered by task then label
    pub async fn labels_for_tasks(
        conn: &mut PgConnection,
        task_ids: &[i64],
    ) -> Result<Vec<TaskLabelRow>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, TaskLabelRow>(
            r#"
            SELECT tl.task_id, l.id, l.family_id, l.name, l.color,
                   l.created_by_id, l.updated_by_id, l.created_at, l.updated_at
            FROM task_labels tl
            JOIN labels l ON l.id = tl.label_id
            WHERE tl.task_id = ANY($1)
            ORDER BY tl.task_id, l.id
            "#,
        )
        .bind(task_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }
}
