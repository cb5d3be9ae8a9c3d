/// Service layer
///
/// Services orchestrate multi-step operations: authorization first, then one
/// or more model calls. They take the request's connection (normally a
/// transaction) and the acting [`CurrentUser`](crate::auth::CurrentUser), and
/// return [`ServiceResult`](crate::error::ServiceResult). Services never
/// commit; the caller commits on success and drops the transaction on error.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod family;
pub mod label;
pub mod task;

/// Page request shared by the list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Pagination {
    /// Number of rows to skip
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must not be negative"))]
    pub skip: i64,

    /// Maximum number of rows to return
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 500, message = "limit must be between 1 and 500"))]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}
