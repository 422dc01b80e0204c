/// Landlord-to-tenant membership
///
/// A landlord owns one membership row per associated tenant. Rows are keyed
/// by `(landlord_id, tenant_id)`, so re-saving a tenant never duplicates them.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE payment_status AS ENUM ('overdue', 'paid');
///
/// CREATE TABLE tenant_memberships (
///     landlord_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     tenant_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     tenant_name TEXT NOT NULL,
///     payment_status payment_status NOT NULL DEFAULT 'overdue',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (landlord_id, tenant_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rent payment status of a tenant, as seen by the landlord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Initial status of every new membership
    #[default]
    Overdue,

    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// One tenant entry on a landlord's list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TenantMembership {
    pub landlord_id: Uuid,

    pub tenant_id: Uuid,

    /// Tenant's email at the time the membership was recorded
    pub tenant_name: String,

    pub payment_status: PaymentStatus,

    pub created_at: DateTime<Utc>,
}

impl TenantMembership {
    /// Builds a fresh membership with the default `overdue` status
    pub fn new(landlord_id: Uuid, tenant_id: Uuid, tenant_name: impl Into<String>) -> Self {
        Self {
            landlord_id,
            tenant_id,
            tenant_name: tenant_name.into(),
            payment_status: PaymentStatus::default(),
            created_at: Utc::now(),
        }
    }
}

/// Tenant row as shown on the landlord dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSummary {
    /// Tenant email
    pub name: String,

    pub status: PaymentStatus,

    pub house_type: Option<String>,
}
