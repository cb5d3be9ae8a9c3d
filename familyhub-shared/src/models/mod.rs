/// Database models for FamilyHub
///
/// Each model owns its table's queries. Every query function takes a
/// `&mut PgConnection` so that a request's transaction can be threaded
/// through several models.
///
/// # Models
///
/// - `user`: Identities from the external identity provider
/// - `family`: Tenancy boundary owning labels and tasks
/// - `membership`: User-family relationships with roles
/// - `label`: Family-scoped tags
/// - `task`: Family-scoped work items, single or routine
/// - `task_label`: Task-label join rows
/// - `routine`: Recurrence settings stored on routine tasks

pub mod family;
pub mod label;
pub mod membership;
pub mod routine;
pub mod task;
pub mod task_label;
pub mod user;

/// Deserializer separating an explicit `null` from an absent field
///
/// Use with `#[serde(default, deserialize_with = "double_option::deserialize")]`
/// on an `Option<Option<T>>`: absent gives `None`, `null` gives `Some(None)`.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
