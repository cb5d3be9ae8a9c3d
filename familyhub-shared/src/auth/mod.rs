/// Identity and authorization
///
/// # Modules
///
/// - [`current_user`]: the resolved caller passed into every service call
/// - [`authorization`]: family existence + membership checks

pub mod authorization;
pub mod current_user;

pub use current_user::CurrentUser;
