/// Storage backends for user accounts and memberships
///
/// The services in this crate never talk to a database directly. They go
/// through the [`UserStore`] trait, and the concrete backend is chosen once
/// at startup and shared as `Arc<dyn UserStore>`.
///
/// # Backends
///
/// - [`postgres::PgUserStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryUserStore`]: process-local maps (development and tests)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewUser, Role, TenantMembership, UpdateUser, UserRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique key is already taken
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for users and landlord memberships
///
/// Every method is a single unconditional write or read; there are no
/// transactions spanning calls. Concurrent writers to the same row race and
/// the last one wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Looks up a user in one role namespace
    async fn find_user(&self, role: Role, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Inserts a user, failing with `Conflict` if `(role, email)` is taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Applies field-level changes; `None` if the user no longer exists
    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> StoreResult<Option<UserRecord>>;

    /// Records the digest and expiry of a freshly issued reset token
    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Adds `tenant` to the landlord's list unless it is already there
    ///
    /// Returns true if a new membership was created. An existing entry keeps
    /// its payment status.
    async fn upsert_membership(&self, landlord_id: Uuid, tenant: &UserRecord) -> StoreResult<bool>;

    /// Lists a landlord's memberships, oldest first
    async fn list_memberships(&self, landlord_id: Uuid) -> StoreResult<Vec<TenantMembership>>;

    /// Lists every email registered under `role`
    async fn list_emails(&self, role: Role) -> StoreResult<Vec<String>>;
}
