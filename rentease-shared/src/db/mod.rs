/// Postgres plumbing for the user store
///
/// - `pool`: connection pool creation, health check and shutdown
/// - `migrations`: embedded schema migrations
///
/// The queries themselves live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
