/// Identity Service
///
/// Registration, login, password reset and profile management. Every
/// operation resolves users through the [`CredentialStore`]; none of them
/// touches the storage backend directly.
///
/// Login is role-unaware: the caller supplies only an email, and the account
/// is resolved landlords first, then tenants. The resulting [`Session`] pins
/// the role for every later request.

use tracing::{info, warn};

use crate::auth::reset_token::ResetToken;
use crate::auth::session::Session;
use crate::credentials::CredentialStore;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Role, SaveUser, UserRecord};

/// Registration form
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    /// Only meaningful for tenants; ignored for landlords
    pub landlord_email: Option<String>,
}

/// Settings form for the logged-in user
///
/// `None` leaves a field untouched. The password only changes when both
/// `current_password` and `new_password` are non-empty.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Applied to tenants only
    pub house_type: Option<String>,
    /// Stored filename of an already written upload
    pub profile_picture: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl ProfileUpdate {
    fn password_change(&self) -> Option<(&str, &str)> {
        let current = self.current_password.as_deref().filter(|p| !p.is_empty())?;
        let new = self.new_password.as_deref().filter(|p| !p.is_empty())?;
        Some((current, new))
    }
}

/// Account lifecycle operations
#[derive(Clone)]
pub struct IdentityService {
    credentials: CredentialStore,
}

impl IdentityService {
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Registers a new account and returns its role
    ///
    /// # Errors
    ///
    /// - `Validation` on an empty email, mismatched confirmation or short password
    /// - `Conflict` if the email is already registered in that role
    pub async fn register(&self, form: Registration) -> ServiceResult<Role> {
        let email = form.email.trim();
        if email.is_empty() {
            return Err(ServiceError::Validation("Email is required.".to_string()));
        }

        if form.password != form.confirm_password {
            return Err(ServiceError::Validation("Passwords do not match.".to_string()));
        }

        let mut user = SaveUser::new(email, form.role).password(form.password);
        if form.role == Role::Tenant {
            user = user.landlord_email(form.landlord_email);
        }

        let record = self.credentials.create(user).await?;
        Ok(record.role)
    }

    /// Checks credentials and returns the session to establish
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<Session> {
        let invalid = || ServiceError::Auth("Invalid credentials".to_string());

        let Some(user) = self.credentials.find_by_email(email.trim(), None).await? else {
            warn!(email = %email, "Login for unknown email");
            return Err(invalid());
        };

        if !self.credentials.check_password(&user, password)? {
            warn!(email = %user.email, role = %user.role, "Login with wrong password");
            return Err(invalid());
        }

        info!(email = %user.email, role = %user.role, "User logged in");
        Ok(Session::new(user.email, user.role))
    }

    /// Issues a reset token for the account behind `email`
    pub async fn request_password_reset(&self, email: &str) -> ServiceResult<ResetToken> {
        let user = self
            .credentials
            .find_by_email(email.trim(), None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No account found with that email.".to_string()))?;

        self.credentials.generate_reset_token(&user).await
    }

    /// Sets a new password for the account behind `email`
    ///
    /// The reset token issued by [`Self::request_password_reset`] is not
    /// checked; anyone who knows the email can complete a reset.
    // TODO: require the token and compare against reset_token_hash and its expiry
    pub async fn complete_password_reset(
        &self,
        email: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ServiceResult<()> {
        if new_password != confirm_password {
            return Err(ServiceError::Validation("Passwords do not match.".to_string()));
        }

        let user = self
            .credentials
            .find_by_email(email.trim(), None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No account found with that email.".to_string()))?;

        self.credentials.reset_password(&user, new_password).await?;
        Ok(())
    }

    /// Record of the session's user in its own role namespace
    pub async fn profile(&self, session: &Session) -> ServiceResult<UserRecord> {
        self.credentials
            .find_by_email(&session.email, Some(session.role))
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Applies a settings form to the session's user
    pub async fn update_profile(
        &self,
        session: &Session,
        changes: ProfileUpdate,
    ) -> ServiceResult<UserRecord> {
        let user = self.profile(session).await?;

        let mut save = SaveUser::new(user.email.clone(), user.role);

        if let Some((current, new)) = changes.password_change() {
            if !self.credentials.check_password(&user, current)? {
                return Err(ServiceError::Validation(
                    "Current password is incorrect".to_string(),
                ));
            }
            save = save.password(new);
        }

        save.first_name = changes.first_name;
        save.last_name = changes.last_name;
        save.phone = changes.phone;
        save.profile_picture = changes.profile_picture;
        if user.role == Role::Tenant {
            save.house_type = changes.house_type;
        }

        let updated = self.credentials.save(save).await?;
        info!(email = %updated.email, role = %updated.role, "Settings updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;
    use std::sync::Arc;

    fn service() -> IdentityService {
        IdentityService::new(CredentialStore::new(Arc::new(MemoryUserStore::new())))
    }

    fn registration(email: &str, password: &str, confirm: &str, role: Role) -> Registration {
        Registration {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            role,
            landlord_email: None,
        }
    }

    #[tokio::test]
    async fn test_register_mismatch_stores_nothing() {
        let svc = service();
        let err = svc
            .register(registration("a@x.com", "password123", "password124", Role::Landlord))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(svc.credentials().find_by_email("a@x.com", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_short_password_stores_nothing() {
        let svc = service();
        let err = svc
            .register(registration("a@x.com", "short", "short", Role::Tenant))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(svc.credentials().find_by_email("a@x.com", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let svc = service();
        svc.register(registration("a@x.com", "password123", "password123", Role::Landlord))
            .await
            .unwrap();

        let err = svc
            .register(registration("a@x.com", "password123", "password123", Role::Landlord))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_returns_session() {
        let svc = service();
        svc.register(registration("t@x.com", "password123", "password123", Role::Tenant))
            .await
            .unwrap();

        let session = svc.login("t@x.com", "password123").await.unwrap();
        assert_eq!(session, Session::new("t@x.com", Role::Tenant));

        assert!(matches!(
            svc.login("t@x.com", "wrongpassword").await,
            Err(ServiceError::Auth(_))
        ));
        assert!(matches!(
            svc.login("ghost@x.com", "password123").await,
            Err(ServiceError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_request_reset_unknown_email() {
        let svc = service();
        assert!(matches!(
            svc.request_password_reset("ghost@x.com").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_reset_mismatch_keeps_hash() {
        let svc = service();
        svc.register(registration("a@x.com", "password123", "password123", Role::Landlord))
            .await
            .unwrap();
        let before = svc.credentials().find_by_email("a@x.com", None).await.unwrap().unwrap();

        let err = svc
            .complete_password_reset("a@x.com", "newpassword1", "newpassword2")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let after = svc.credentials().find_by_email("a@x.com", None).await.unwrap().unwrap();
        assert_eq!(before.password_hash, after.password_hash);
    }

    #[tokio::test]
    async fn test_complete_reset_changes_login_password() {
        let svc = service();
        svc.register(registration("a@x.com", "password123", "password123", Role::Landlord))
            .await
            .unwrap();

        svc.complete_password_reset("a@x.com", "newpassword1", "newpassword1")
            .await
            .unwrap();

        assert!(svc.login("a@x.com", "newpassword1").await.is_ok());
        assert!(svc.login("a@x.com", "password123").await.is_err());
    }

    #[tokio::test]
    async fn test_update_profile_requires_current_password() {
        let svc = service();
        svc.register(registration("t@x.com", "password123", "password123", Role::Tenant))
            .await
            .unwrap();
        let session = Session::new("t@x.com", Role::Tenant);

        let err = svc
            .update_profile(
                &session,
                ProfileUpdate {
                    current_password: Some("wrongpassword".to_string()),
                    new_password: Some("newpassword1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Current password is incorrect"));
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let svc = service();
        svc.register(registration("t@x.com", "password123", "password123", Role::Tenant))
            .await
            .unwrap();
        let session = Session::new("t@x.com", Role::Tenant);

        svc.update_profile(
            &session,
            ProfileUpdate {
                first_name: Some("Ada".to_string()),
                house_type: Some("Apartment".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = svc
            .update_profile(
                &session,
                ProfileUpdate {
                    phone: Some("555-0100".to_string()),
                    // Only one half of the pair: password stays
                    new_password: Some("newpassword1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name.as_deref(), Some("Ada"));
        assert_eq!(updated.house_type.as_deref(), Some("Apartment"));
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert!(svc.login("t@x.com", "password123").await.is_ok());
    }

    #[tokio::test]
    async fn test_landlord_profile_ignores_house_type() {
        let svc = service();
        svc.register(registration("l@x.com", "password123", "password123", Role::Landlord))
            .await
            .unwrap();

        let updated = svc
            .update_profile(
                &Session::new("l@x.com", Role::Landlord),
                ProfileUpdate {
                    house_type: Some("Villa".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.house_type.is_none());
    }
}
