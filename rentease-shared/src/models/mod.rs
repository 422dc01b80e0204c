/// Data models for RentEase
///
/// # Models
///
/// - `user`: landlord and tenant accounts (one table, role discriminant)
/// - `membership`: landlord-owned tenant list with payment status

pub mod membership;
pub mod user;

pub use membership::{PaymentStatus, TenantMembership, TenantSummary};
pub use user::{NewUser, Role, SaveUser, UpdateUser, UserRecord};
