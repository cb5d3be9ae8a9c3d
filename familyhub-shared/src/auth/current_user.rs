/// The acting user attached to each request
///
/// Authentication itself happens outside this crate. Whatever resolves the
/// caller hands the service layer a `CurrentUser`, which is all the services
/// need to know about who is acting.

use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Resolved identity of the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User ID
    pub id: i64,

    /// Display name
    pub name: Option<String>,

    /// Email address
    pub email: Option<String>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
