/// In-memory user store for development and tests
///
/// Keeps users keyed by `(role, email)` and memberships in insertion order.
/// Nothing survives a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, Role, TenantMembership, UpdateUser, UserRecord};

/// Process-local user store
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<(Role, String), UserRecord>>>,
    memberships: Arc<RwLock<Vec<TenantMembership>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users across both roles
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user(&self, role: Role, email: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(&(role, email.to_string())).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        let key = (user.role, user.email.clone());
        if users.contains_key(&key) {
            return Err(StoreError::Conflict(format!("{} {}", user.role, user.email)));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            profile_picture: user.profile_picture,
            house_type: user.house_type,
            landlord_email: user.landlord_email,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(key, record.clone());

        Ok(record)
    }

    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> StoreResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        let Some(user) = users.values_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        changes.apply_to(user);
        Ok(Some(user.clone()))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.values_mut().find(|u| u.id == id) {
            Some(user) => {
                user.reset_token_hash = Some(token_hash.to_string());
                user.reset_token_expires_at = Some(expires_at);
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn upsert_membership(&self, landlord_id: Uuid, tenant: &UserRecord) -> StoreResult<bool> {
        let mut memberships = self.memberships.write().await;
        let exists = memberships
            .iter()
            .any(|m| m.landlord_id == landlord_id && m.tenant_id == tenant.id);
        if exists {
            return Ok(false);
        }

        memberships.push(TenantMembership::new(landlord_id, tenant.id, tenant.email.clone()));
        Ok(true)
    }

    async fn list_memberships(&self, landlord_id: Uuid) -> StoreResult<Vec<TenantMembership>> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .iter()
            .filter(|m| m.landlord_id == landlord_id)
            .cloned()
            .collect())
    }

    async fn list_emails(&self, role: Role) -> StoreResult<Vec<String>> {
        let users = self.users.read().await;
        let mut emails: Vec<String> = users
            .keys()
            .filter(|(r, _)| *r == role)
            .map(|(_, email)| email.clone())
            .collect();
        emails.sort();
        Ok(emails)
    }
}
