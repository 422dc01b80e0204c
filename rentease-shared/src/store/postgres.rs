/// PostgreSQL user store
///
/// # Example
///
/// ```no_run
/// use rentease_shared::db::pool::{create_pool, PoolSettings};
/// use rentease_shared::store::{PgUserStore, UserStore};
/// use rentease_shared::models::Role;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(PoolSettings::new(std::env::var("DATABASE_URL")?)).await?;
/// let store = PgUserStore::new(pool);
///
/// if let Some(user) = store.find_user(Role::Landlord, "landlord@x.com").await? {
///     println!("Found landlord: {}", user.id);
/// }
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, Role, TenantMembership, UpdateUser, UserRecord};

const USER_COLUMNS: &str = "id, email, role, password_hash, first_name, last_name, phone, \
     profile_picture, house_type, landlord_email, reset_token_hash, reset_token_expires_at, \
     created_at, updated_at";

/// User store backed by a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique violations to `StoreError::Conflict`
fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique key").to_string();
            return StoreError::Conflict(constraint);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, role: Role, email: &str) -> StoreResult<Option<UserRecord>> {
        let query = format!("SELECT {} FROM users WHERE role = $1 AND email = $2", USER_COLUMNS);

        let user = sqlx::query_as::<_, UserRecord>(&query)
            .bind(role)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let query = format!(
            r#"
            INSERT INTO users (email, role, password_hash, first_name, last_name, phone,
                               profile_picture, house_type, landlord_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(user.email)
            .bind(user.role)
            .bind(user.password_hash)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.phone)
            .bind(user.profile_picture)
            .bind(user.house_type)
            .bind(user.landlord_email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)
    }

    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> StoreResult<Option<UserRecord>> {
        // Build the SET list from whichever fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        let columns = [
            ("password_hash", changes.password_hash.is_some()),
            ("first_name", changes.first_name.is_some()),
            ("last_name", changes.last_name.is_some()),
            ("phone", changes.phone.is_some()),
            ("profile_picture", changes.profile_picture.is_some()),
            ("house_type", changes.house_type.is_some()),
            ("landlord_email", changes.landlord_email.is_some()),
        ];
        for (column, present) in columns {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {} = ${}", column, bind_count));
            }
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        // Bind order must match the column order above
        let mut q = sqlx::query_as::<_, UserRecord>(&query).bind(id);
        for value in [
            changes.password_hash,
            changes.first_name,
            changes.last_name,
            changes.phone,
            changes.profile_picture,
            changes.house_type,
            changes.landlord_email,
        ]
        .into_iter()
        .flatten()
        {
            q = q.bind(value);
        }

        let user = q.fetch_optional(&self.pool).await?;

        Ok(user)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_membership(&self, landlord_id: Uuid, tenant: &UserRecord) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO tenant_memberships (landlord_id, tenant_id, tenant_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (landlord_id, tenant_id) DO NOTHING
            "#,
        )
        .bind(landlord_id)
        .bind(tenant.id)
        .bind(&tenant.email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_memberships(&self, landlord_id: Uuid) -> StoreResult<Vec<TenantMembership>> {
        let memberships = sqlx::query_as::<_, TenantMembership>(
            r#"
            SELECT landlord_id, tenant_id, tenant_name, payment_status, created_at
            FROM tenant_memberships
            WHERE landlord_id = $1
            ORDER BY created_at ASC, tenant_name ASC
            "#,
        )
        .bind(landlord_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    async fn list_emails(&self, role: Role) -> StoreResult<Vec<String>> {
        let emails: Vec<String> =
            sqlx::query_scalar("SELECT email FROM users WHERE role = $1 ORDER BY email")
                .bind(role)
                .fetch_all(&self.pool)
                .await?;

        Ok(emails)
    }
}
