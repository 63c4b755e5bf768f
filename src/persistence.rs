//! Shared `PostgreSQL` plumbing for the Diesel-backed adapters.
//!
//! Diesel connections are synchronous, so every repository call hops onto
//! the blocking thread pool through [`run_blocking`] with a pooled
//! connection.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// `PostgreSQL` connection pool shared by every adapter.
pub type DispatchPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be opened.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<DispatchPgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Scale used for currency columns stored as integer cents.
pub(crate) const CENTS: u32 = 2;

/// Scale used for distance columns stored as integer meters of a kilometer.
pub(crate) const METERS: u32 = 3;

/// Converts an exact decimal into integer minor units at `scale`.
pub(crate) fn to_minor_units(amount: Decimal, scale: u32) -> std::io::Result<i64> {
    let factor = Decimal::from(10_i64.pow(scale));
    amount
        .checked_mul(factor)
        .and_then(|scaled| scaled.round().to_i64())
        .ok_or_else(|| std::io::Error::other(format!("amount {amount} out of storable range")))
}

/// Converts integer minor units at `scale` back into an exact decimal.
pub(crate) fn from_minor_units(units: i64, scale: u32) -> Decimal {
    Decimal::new(units, scale)
}

/// Repository errors that can wrap an arbitrary persistence failure.
pub(crate) trait PersistenceFailure: Sized {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}

/// Runs `f` with a pooled connection on the blocking thread pool.
pub(crate) async fn run_blocking<F, T, E>(pool: &DispatchPgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: PersistenceFailure + Send + 'static,
{
    let owned_pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = owned_pool.get().map_err(E::from_persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(E::from_persistence)?
}
