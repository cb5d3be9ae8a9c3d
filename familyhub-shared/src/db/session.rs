/// Per-request database sessions
///
/// A request's unit of work is one transaction. The handler begins it, passes
/// `&mut tx` to the service layer, and commits once the service returns
/// successfully:
///
/// ```no_run
/// use familyhub_shared::db::session;
/// use familyhub_shared::models::family::Family;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let mut tx = session::begin(&pool).await?;
/// let family = Family::find_by_id(&mut tx, 1).await?;
/// session::commit(tx).await?;
/// # Ok(())
/// # }
/// ```
///
/// Returning early with `?` drops the transaction, which rolls it back. The
/// same happens when the request future is cancelled mid-flight, so no
/// partial write is ever committed.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// Transaction held for the duration of one request
pub type DbTransaction = Transaction<'static, Postgres>;

/// Starts a transaction on a pooled connection
pub async fn begin(pool: &PgPool) -> Result<DbTransaction, sqlx::Error> {
    let tx = pool.begin().await?;
    debug!("Transaction started");
    Ok(tx)
}

/// Commits a transaction, releasing its connection back to the pool
pub async fn commit(tx: DbTransaction) -> Result<(), sqlx::Error> {
    tx.commit().await?;
    debug!("Transaction committed");
    Ok(())
}
