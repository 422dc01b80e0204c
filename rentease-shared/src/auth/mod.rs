/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and the minimum-length policy
/// - [`session`]: signed session tokens carrying email and role
/// - [`reset_token`]: random password reset tokens and their digests
/// - [`middleware`]: session cookie middleware and the `Session` extractor
/// - [`authorization`]: the role guard
///
/// # Example
///
/// ```no_run
/// use rentease_shared::auth::password::{hash_password, verify_password};
/// use rentease_shared::auth::session::{issue_session_token, Session};
/// use rentease_shared::models::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("password123")?;
/// assert!(verify_password("password123", &hash)?);
///
/// let session = Session::new("tenant@x.com", Role::Tenant);
/// let token = issue_session_token(&session, "a-session-secret-of-at-least-32-bytes", chrono::Duration::hours(24))?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod middleware;
pub mod password;
pub mod reset_token;
pub mod session;
