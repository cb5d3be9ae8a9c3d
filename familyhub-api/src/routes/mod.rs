/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Welcome message and health check
/// - `users`: The current user
/// - `families`: Families and their members
/// - `labels`: Family-scoped labels
/// - `tasks`: Family-scoped tasks
///
/// Every family-scoped handler runs its service call inside one transaction:
/// it commits on success, and any error return drops (rolls back) it.

pub mod families;
pub mod health;
pub mod labels;
pub mod tasks;
pub mod users;
