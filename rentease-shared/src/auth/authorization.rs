/// Role checks
///
/// RentEase has exactly one authorization rule: some resources belong to
/// landlords and some to tenants. [`require_role`] is the guard every
/// protected path goes through, whether it is called from a service or wrapped
/// in route middleware by the API crate.
///
/// # Example
///
/// ```
/// use rentease_shared::auth::authorization::{require_role, AuthzError};
/// use rentease_shared::auth::session::Session;
/// use rentease_shared::models::Role;
///
/// let session = Session::new("tenant@x.com", Role::Tenant);
///
/// assert!(require_role(Some(&session), Role::Tenant).is_ok());
/// assert!(matches!(
///     require_role(Some(&session), Role::Landlord),
///     Err(AuthzError::WrongRole { .. })
/// ));
/// assert!(matches!(require_role(None, Role::Tenant), Err(AuthzError::Unauthenticated)));
/// ```

use super::session::Session;
use crate::models::Role;

/// Error type for role checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No session at all
    #[error("Unauthorized")]
    Unauthenticated,

    /// Logged in, but as the other role
    #[error("Access Denied. Requires role {required}, session has {actual}")]
    WrongRole { required: Role, actual: Role },
}

/// Passes the session through if it holds `required`
pub fn require_role(session: Option<&Session>, required: Role) -> Result<&Session, AuthzError> {
    let session = session.ok_or(AuthzError::Unauthenticated)?;

    if session.role != required {
        return Err(AuthzError::WrongRole {
            required,
            actual: session.role,
        });
    }

    Ok(session)
}
