/// Label service
///
/// All operations are scoped to a family and start with the membership
/// check. Label names are unique within a family.

use sqlx::PgConnection;
use tracing::info;

use crate::auth::authorization::require_family_membership;
use crate::auth::CurrentUser;
use crate::error::{ServiceError, ServiceResult};
use crate::models::label::{CreateLabel, Label, UpdateLabel};
use crate::services::Pagination;

fn duplicate_name(name: &str) -> String {
    format!("Label name '{}' already exists in this family.", name)
}

fn not_found(label_id: i64, family_id: i64) -> ServiceError {
    ServiceError::NotFound(format!(
        "Label with ID {} not found in family {}",
        label_id, family_id
    ))
}

/// Creates a label in a family
///
/// # Errors
///
/// - `ServiceError::NotFound` / `ServiceError::Forbidden` from the membership check
/// - `ServiceError::Conflict` if the name is taken in this family
pub async fn create_label(
    conn: &mut PgConnection,
    data: &CreateLabel,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<Label> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    if Label::find_by_name(&mut *conn, family_id, &data.name).await?.is_some() {
        return Err(ServiceError::Conflict(duplicate_name(&data.name)));
    }

    let label = Label::create(&mut *conn, family_id, data, user.id)
        .await
        .map_err(|e| ServiceError::conflict_on_unique(e, duplicate_name(&data.name)))?;

    info!(
        label_id = label.id,
        family_id,
        user_id = user.id,
        name = %label.name,
        "Label created"
    );

    Ok(label)
}

/// Lists a page of a family's labels in insertion order
pub async fn list_labels(
    conn: &mut PgConnection,
    family_id: i64,
    user: &CurrentUser,
    page: Pagination,
) -> ServiceResult<Vec<Label>> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    let labels = Label::list_by_family(&mut *conn, family_id, page.limit, page.skip).await?;
    Ok(labels)
}

/// Fetches one label
///
/// A label that exists in another family is reported as not found.
pub async fn get_label(
    conn: &mut PgConnection,
    label_id: i64,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<Label> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    Label::find_in_family(&mut *conn, label_id, family_id)
        .await?
        .ok_or_else(|| not_found(label_id, family_id))
}

/// Applies a partial update to a label
///
/// # Errors
///
/// - `ServiceError::NotFound` if the label is not in this family
/// - `ServiceError::Conflict` if renaming onto another label's name
pub async fn update_label(
    conn: &mut PgConnection,
    label_id: i64,
    data: &UpdateLabel,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<Label> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    let current = Label::find_in_family(&mut *conn, label_id, family_id)
        .await?
        .ok_or_else(|| not_found(label_id, family_id))?;

    if let Some(name) = data.name.as_deref() {
        if name != current.name {
            if let Some(other) = Label::find_by_name(&mut *conn, family_id, name).await? {
                if other.id != label_id {
                    return Err(ServiceError::Conflict(duplicate_name(name)));
                }
            }
        }
    }

    let conflict_name = data.name.clone().unwrap_or_else(|| current.name.clone());
    let label = Label::update(&mut *conn, label_id, family_id, data, user.id)
        .await
        .map_err(|e| ServiceError::conflict_on_unique(e, duplicate_name(&conflict_name)))?
        .ok_or_else(|| not_found(label_id, family_id))?;

    info!(label_id, family_id, user_id = user.id, "Label updated");
    Ok(label)
}

/// Deletes a label; tasks carrying it lose the association
pub async fn delete_label(
    conn: &mut PgConnection,
    label_id: i64,
    family_id: i64,
    user: &CurrentUser,
) -> ServiceResult<()> {
    require_family_membership(&mut *conn, family_id, user.id).await?;

    if !Label::delete(&mut *conn, label_id, family_id).await? {
        return Err(not_found(label_id, family_id));
    }

    info!(label_id, family_id, user_id = user.id, "Label deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            duplicate_name("Groceries"),
            "Label name 'Groceries' already exists in this family."
        );
        assert_eq!(
            not_found(4, 2).to_string(),
            "Label with ID 4 not found in family 2"
        );
    }
}
