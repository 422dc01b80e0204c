/// Credential Store
///
/// Role-aware persistence of user records on top of a [`UserStore`]
/// backend. This is the only place plaintext passwords are turned into
/// Argon2id hashes, and the only place tenant to landlord memberships are
/// maintained.
///
/// # Save semantics
///
/// [`CredentialStore::save`] is an upsert keyed by `(role, email)`:
///
/// - existing record: only the fields set on the [`SaveUser`] are replaced
/// - missing record: a new one is inserted (a password is then mandatory)
/// - tenant with a `landlord_email`: the landlord gets a membership entry
///   with status `overdue` unless it already has one
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use rentease_shared::credentials::CredentialStore;
/// use rentease_shared::models::{Role, SaveUser};
/// use rentease_shared::store::MemoryUserStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = CredentialStore::new(Arc::new(MemoryUserStore::new()));
///
/// store.save(SaveUser::new("landlord@x.com", Role::Landlord).password("password123")).await?;
/// let found = store.find_by_email("landlord@x.com", None).await?;
/// assert_eq!(found.map(|u| u.role), Some(Role::Landlord));
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::password::{hash_password, validate_password_length, verify_password};
use crate::auth::reset_token::{
    generate_reset_token, hash_reset_token, ResetToken, DEFAULT_RESET_TOKEN_TTL_SECS,
};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{NewUser, Role, SaveUser, UpdateUser, UserRecord};
use crate::store::UserStore;

/// Role-aware credential persistence
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn UserStore>,
    reset_token_ttl: Duration,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn UserStore>) -> Self {
        Self {
            backend,
            reset_token_ttl: Duration::seconds(DEFAULT_RESET_TOKEN_TTL_SECS),
        }
    }

    /// Overrides the lifetime of issued reset tokens
    pub fn with_reset_token_ttl(mut self, ttl: Duration) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    pub fn backend(&self) -> &Arc<dyn UserStore> {
        &self.backend
    }

    /// Upserts a user by `(role, email)`
    ///
    /// # Errors
    ///
    /// - `Validation` if a set password is too short, or a new record has none
    /// - `Conflict` if a concurrent insert took the key first
    pub async fn save(&self, user: SaveUser) -> ServiceResult<UserRecord> {
        let password_hash = match user.password.as_deref() {
            Some(password) => {
                validate_password_length(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let record = match self.backend.find_user(user.role, &user.email).await? {
            Some(existing) => {
                let changes = UpdateUser {
                    password_hash,
                    first_name: user.first_name,
                    last_name: user.last_name,
                    phone: user.phone,
                    profile_picture: user.profile_picture,
                    house_type: user.house_type,
                    landlord_email: user.landlord_email,
                };

                if changes.is_empty() {
                    existing
                } else {
                    self.backend
                        .update_user(existing.id, changes)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?
                }
            }
            None => {
                let password_hash = password_hash
                    .ok_or_else(|| ServiceError::Validation("Password is required.".to_string()))?;

                let created = self
                    .backend
                    .insert_user(NewUser {
                        email: user.email,
                        role: user.role,
                        password_hash,
                        first_name: user.first_name,
                        last_name: user.last_name,
                        phone: user.phone,
                        profile_picture: user.profile_picture,
                        house_type: user.house_type,
                        landlord_email: user.landlord_email,
                    })
                    .await?;

                info!(email = %created.email, role = %created.role, "User created");
                created
            }
        };

        if record.role == Role::Tenant {
            if let Some(landlord_email) = record.landlord_email.as_deref() {
                self.sync_membership(landlord_email, &record).await?;
            }
        }

        Ok(record)
    }

    /// Inserts a new user, refusing to touch an existing `(role, email)`
    pub async fn create(&self, user: SaveUser) -> ServiceResult<UserRecord> {
        if self.backend.find_user(user.role, &user.email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A {} account with this email already exists.",
                user.role
            )));
        }

        self.save(user).await
    }

    /// Looks a user up by email
    ///
    /// With a role only that namespace is searched. Without one, landlords are
    /// searched before tenants and the first hit wins.
    pub async fn find_by_email(
        &self,
        email: &str,
        role: Option<Role>,
    ) -> ServiceResult<Option<UserRecord>> {
        if let Some(role) = role {
            return Ok(self.backend.find_user(role, email).await?);
        }

        for role in Role::LOOKUP_ORDER {
            if let Some(user) = self.backend.find_user(role, email).await? {
                return Ok(Some(user));
            }
        }

        Ok(None)
    }

    /// Verifies `candidate` against the record's stored hash
    pub fn check_password(&self, user: &UserRecord, candidate: &str) -> ServiceResult<bool> {
        Ok(verify_password(candidate, &user.password_hash)?)
    }

    /// Issues a reset token and stores its digest on the record
    pub async fn generate_reset_token(&self, user: &UserRecord) -> ServiceResult<ResetToken> {
        let token = generate_reset_token();
        let expires_at = Utc::now() + self.reset_token_ttl;

        let stored = self
            .backend
            .set_reset_token(user.id, &hash_reset_token(&token), expires_at)
            .await?;
        if !stored {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        debug!(email = %user.email, role = %user.role, %expires_at, "Reset token issued");
        Ok(ResetToken { token, expires_at })
    }

    /// Replaces the password after the length check
    ///
    /// No reset token is consulted here; callers reach this after an email
    /// lookup only.
    pub async fn reset_password(
        &self,
        user: &UserRecord,
        new_password: &str,
    ) -> ServiceResult<UserRecord> {
        validate_password_length(new_password)?;
        let password_hash = hash_password(new_password)?;

        let updated = self
            .backend
            .update_user(
                user.id,
                UpdateUser {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        info!(email = %updated.email, role = %updated.role, "Password reset");
        Ok(updated)
    }

    async fn sync_membership(&self, landlord_email: &str, tenant: &UserRecord) -> ServiceResult<()> {
        let Some(landlord) = self.backend.find_user(Role::Landlord, landlord_email).await? else {
            warn!(
                tenant = %tenant.email,
                landlord = %landlord_email,
                "Tenant names an unknown landlord, membership skipped"
            );
            return Ok(());
        };

        if self.backend.upsert_membership(landlord.id, tenant).await? {
            info!(tenant = %tenant.email, landlord = %landlord.email, "Tenant added to landlord");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use crate::store::MemoryUserStore;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryUserStore::new()))
    }

    #[tokio::test]
    async fn test_insert_requires_password() {
        let store = store();
        let err = store
            .save(SaveUser::new("a@x.com", Role::Landlord))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_short_password_rejected_before_storage() {
        let store = store();
        let err = store
            .save(SaveUser::new("a@x.com", Role::Landlord).password("short"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.find_by_email("a@x.com", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_updates_only_set_fields() {
        let store = store();
        let mut first = SaveUser::new("t@x.com", Role::Tenant).password("password123");
        first.first_name = Some("Ada".to_string());
        first.phone = Some("555-0100".to_string());
        let created = store.save(first).await.unwrap();

        let mut second = SaveUser::new("t@x.com", Role::Tenant);
        second.phone = Some("555-0199".to_string());
        let updated = store.save(second).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_name.as_deref(), Some("Ada"));
        assert_eq!(updated.phone.as_deref(), Some("555-0199"));
        assert_eq!(updated.password_hash, created.password_hash);
    }

    #[tokio::test]
    async fn test_create_rejects_existing_key() {
        let store = store();
        store
            .create(SaveUser::new("a@x.com", Role::Landlord).password("password123"))
            .await
            .unwrap();

        let err = store
            .create(SaveUser::new("a@x.com", Role::Landlord).password("password456"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Other namespace is independent
        store
            .create(SaveUser::new("a@x.com", Role::Tenant).password("password456"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_lookup_prefers_landlord() {
        let store = store();
        store
            .save(SaveUser::new("both@x.com", Role::Tenant).password("password123"))
            .await
            .unwrap();
        store
            .save(SaveUser::new("both@x.com", Role::Landlord).password("password123"))
            .await
            .unwrap();

        let found = store.find_by_email("both@x.com", None).await.unwrap().unwrap();
        assert_eq!(found.role, Role::Landlord);

        let tenant = store
            .find_by_email("both@x.com", Some(Role::Tenant))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tenant.role, Role::Tenant);
    }

    #[tokio::test]
    async fn test_tenant_save_maintains_single_membership() {
        let store = store();
        let landlord = store
            .save(SaveUser::new("l@x.com", Role::Landlord).password("password123"))
            .await
            .unwrap();

        let tenant = SaveUser::new("t@x.com", Role::Tenant)
            .password("password123")
            .landlord_email(Some("l@x.com".to_string()));
        store.save(tenant.clone()).await.unwrap();
        store.save(SaveUser::new("t@x.com", Role::Tenant)).await.unwrap();

        let memberships = store.backend().list_memberships(landlord.id).await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].tenant_name, "t@x.com");
        assert_eq!(memberships[0].payment_status, PaymentStatus::Overdue);
    }

    #[tokio::test]
    async fn test_unknown_landlord_is_skipped() {
        let store = store();
        let tenant = store
            .save(
                SaveUser::new("t@x.com", Role::Tenant)
                    .password("password123")
                    .landlord_email(Some("ghost@x.com".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(tenant.landlord_email.as_deref(), Some("ghost@x.com"));
    }

    #[tokio::test]
    async fn test_check_password() {
        let store = store();
        let user = store
            .save(SaveUser::new("a@x.com", Role::Landlord).password("password123"))
            .await
            .unwrap();

        assert!(store.check_password(&user, "password123").unwrap());
        assert!(!store.check_password(&user, "password124").unwrap());
    }

    #[tokio::test]
    async fn test_reset_tokens_are_fresh_and_stored_hashed() {
        let store = store().with_reset_token_ttl(Duration::minutes(5));
        let user = store
            .save(SaveUser::new("a@x.com", Role::Landlord).password("password123"))
            .await
            .unwrap();

        let first = store.generate_reset_token(&user).await.unwrap();
        let second = store.generate_reset_token(&user).await.unwrap();
        assert_ne!(first.token, second.token);
        assert!(second.expires_at <= Utc::now() + Duration::minutes(5));

        let stored = store.find_by_email("a@x.com", None).await.unwrap().unwrap();
        assert_eq!(stored.reset_token_hash, Some(hash_reset_token(&second.token)));
    }

    #[tokio::test]
    async fn test_reset_password_rehashes() {
        let store = store();
        let user = store
            .save(SaveUser::new("a@x.com", Role::Landlord).password("password123"))
            .await
            .unwrap();

        assert!(store.reset_password(&user, "short").await.is_err());

        let updated = store.reset_password(&user, "newpassword1").await.unwrap();
        assert!(store.check_password(&updated, "newpassword1").unwrap());
        assert!(!store.check_password(&updated, "password123").unwrap());
    }
}
