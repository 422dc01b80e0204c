/// User model shared by both roles
///
/// Landlords and tenants live in one `users` table, separated by a `role`
/// discriminant. Each role keeps its own email namespace, so the same address
/// may be registered once as a landlord and once as a tenant.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('tenant', 'landlord');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL,
///     role user_role NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(255),
///     last_name VARCHAR(255),
///     phone VARCHAR(64),
///     profile_picture VARCHAR(512),
///     house_type VARCHAR(255),
///     landlord_email TEXT,
///     reset_token_hash VARCHAR(64),
///     reset_token_expires_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (role, email)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Rents a property, may name a landlord
    Tenant,

    /// Owns properties, tracks tenants and their payment status
    Landlord,
}

impl Role {
    /// Order used by role-unaware email lookups
    pub const LOOKUP_ORDER: [Role; 2] = [Role::Landlord, Role::Tenant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tenant => "tenant",
            Role::Landlord => "landlord",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tenant" => Ok(Role::Tenant),
            "landlord" => Ok(Role::Landlord),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A stored user account
///
/// Secrets (`password_hash`, `reset_token_hash`) are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique within `role`
    pub email: String,

    /// Which namespace the account belongs to
    pub role: Role,

    /// Argon2id PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub phone: Option<String>,

    /// Filename of the uploaded picture inside the upload directory
    pub profile_picture: Option<String>,

    /// Kind of dwelling the tenant rents (tenants only)
    pub house_type: Option<String>,

    /// Email of the tenant's landlord (tenants only)
    pub landlord_email: Option<String>,

    /// SHA-256 hex digest of the last issued reset token
    #[serde(skip_serializing, default)]
    pub reset_token_hash: Option<String>,

    pub reset_token_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a new user
///
/// The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub house_type: Option<String>,
    pub landlord_email: Option<String>,
}

/// Field-level changes for an existing user
///
/// Only `Some` fields are written; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub house_type: Option<String>,
    pub landlord_email: Option<String>,
}

impl UpdateUser {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.profile_picture.is_none()
            && self.house_type.is_none()
            && self.landlord_email.is_none()
    }

    /// Applies the set fields to an in-memory record
    pub fn apply_to(self, user: &mut UserRecord) {
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
        if let Some(v) = self.first_name {
            user.first_name = Some(v);
        }
        if let Some(v) = self.last_name {
            user.last_name = Some(v);
        }
        if let Some(v) = self.phone {
            user.phone = Some(v);
        }
        if let Some(v) = self.profile_picture {
            user.profile_picture = Some(v);
        }
        if let Some(v) = self.house_type {
            user.house_type = Some(v);
        }
        if let Some(v) = self.landlord_email {
            user.landlord_email = Some(v);
        }
        user.updated_at = Utc::now();
    }
}

/// A role-tagged record handed to `CredentialStore::save`
///
/// The password is plaintext here; the store validates and hashes it.
/// Every other field follows the "set means replace" rule of `UpdateUser`.
#[derive(Debug, Clone)]
pub struct SaveUser {
    pub email: String,
    pub role: Role,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub house_type: Option<String>,
    pub landlord_email: Option<String>,
}

impl SaveUser {
    /// Starts a record with only the key fields set
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            password: None,
            first_name: None,
            last_name: None,
            phone: None,
            profile_picture: None,
            house_type: None,
            landlord_email: None,
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the landlord back-reference; blank values are dropped
    pub fn landlord_email(mut self, landlord_email: Option<String>) -> Self {
        self.landlord_email = landlord_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        self
    }

    pub fn house_type(mut self, house_type: Option<String>) -> Self {
        self.house_type = house_type;
        self
    }
}
