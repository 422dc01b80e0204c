/// Relationship Index
///
/// Read side of the landlord to tenant relation. Memberships are written by
/// [`CredentialStore::save`](crate::credentials::CredentialStore::save) when a
/// tenant names a landlord; this module only projects them for dashboards.

use std::sync::Arc;
use tracing::debug;

use crate::auth::authorization::require_role;
use crate::auth::session::Session;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Role, TenantSummary};
use crate::store::UserStore;

/// Landlord and tenant lookups for dashboards
#[derive(Clone)]
pub struct RelationshipIndex {
    backend: Arc<dyn UserStore>,
}

impl RelationshipIndex {
    pub fn new(backend: Arc<dyn UserStore>) -> Self {
        Self { backend }
    }

    /// Tenants of the logged-in landlord with their payment status
    ///
    /// Each entry carries the tenant's current `house_type`. Memberships whose
    /// tenant account no longer resolves are left out.
    ///
    /// # Errors
    ///
    /// - `Authorization` if the session is not a landlord's
    /// - `NotFound` if the landlord account is gone
    pub async fn list_tenants_for(&self, session: &Session) -> ServiceResult<Vec<TenantSummary>> {
        let session = require_role(Some(session), Role::Landlord)
            .map_err(|e| ServiceError::Authorization(e.to_string()))?;

        let landlord = self
            .backend
            .find_user(Role::Landlord, &session.email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Landlord not found".to_string()))?;

        let memberships = self.backend.list_memberships(landlord.id).await?;
        let mut tenants = Vec::with_capacity(memberships.len());

        for membership in memberships {
            match self.backend.find_user(Role::Tenant, &membership.tenant_name).await? {
                Some(tenant) => tenants.push(TenantSummary {
                    name: membership.tenant_name,
                    status: membership.payment_status,
                    house_type: tenant.house_type,
                }),
                None => {
                    debug!(tenant = %membership.tenant_name, "Skipping membership of missing tenant");
                }
            }
        }

        Ok(tenants)
    }

    /// Every registered landlord email, for the registration form
    pub async fn list_landlord_emails(&self) -> ServiceResult<Vec<String>> {
        Ok(self.backend.list_emails(Role::Landlord).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialStore;
    use crate::models::{PaymentStatus, SaveUser};
    use crate::store::MemoryUserStore;

    async fn seeded() -> (RelationshipIndex, CredentialStore) {
        let backend: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let credentials = CredentialStore::new(backend.clone());

        credentials
            .save(SaveUser::new("landlord@x.com", Role::Landlord).password("password123"))
            .await
            .unwrap();
        credentials
            .save(
                SaveUser::new("tenant@x.com", Role::Tenant)
                    .password("password123")
                    .landlord_email(Some("landlord@x.com".to_string())),
            )
            .await
            .unwrap();

        (RelationshipIndex::new(backend), credentials)
    }

    #[tokio::test]
    async fn test_landlord_sees_tenant_as_overdue() {
        let (index, _) = seeded().await;
        let tenants = index
            .list_tenants_for(&Session::new("landlord@x.com", Role::Landlord))
            .await
            .unwrap();

        assert_eq!(
            tenants,
            vec![TenantSummary {
                name: "tenant@x.com".to_string(),
                status: PaymentStatus::Overdue,
                house_type: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_house_type_is_read_live() {
        let (index, credentials) = seeded().await;
        credentials
            .save(SaveUser::new("tenant@x.com", Role::Tenant).house_type(Some("Duplex".to_string())))
            .await
            .unwrap();

        let tenants = index
            .list_tenants_for(&Session::new("landlord@x.com", Role::Landlord))
            .await
            .unwrap();
        assert_eq!(tenants[0].house_type.as_deref(), Some("Duplex"));
    }

    #[tokio::test]
    async fn test_tenant_session_is_rejected() {
        let (index, _) = seeded().await;
        let err = index
            .list_tenants_for(&Session::new("tenant@x.com", Role::Tenant))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_missing_landlord_is_not_found() {
        let (index, _) = seeded().await;
        let err = index
            .list_tenants_for(&Session::new("ghost@x.com", Role::Landlord))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_landlord_emails() {
        let (index, _) = seeded().await;
        assert_eq!(index.list_landlord_emails().await.unwrap(), vec!["landlord@x.com"]);
    }
}
