/// Database layer for FamilyHub
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded migration runner and schema reset
/// - `session`: Transaction-per-request helpers
/// - Models are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use familyhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         connect_options: std::env::var("DATABASE_URL")?.parse()?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod session;
