/// Signed session tokens
///
/// After login the server hands the browser a session cookie holding an
/// HS256 JWT. The token carries the resolved email and role; nothing is
/// kept server-side, so a valid signature is the whole session.
///
/// # Claims
///
/// - `sub`: account email
/// - `role`: `tenant` or `landlord`
/// - `iss`: always `rentease`
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use rentease_shared::auth::session::{decode_session_token, issue_session_token, Session};
/// use rentease_shared::models::Role;
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-session-secret-of-at-least-32-bytes!";
/// let session = Session::new("landlord@x.com", Role::Landlord);
///
/// let token = issue_session_token(&session, secret, Duration::hours(24))?;
/// assert_eq!(decode_session_token(&token, secret)?, session);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Issuer claim for every session token
pub const SESSION_ISSUER: &str = "rentease";

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session on the request
    #[error("Unauthorized")]
    Missing,

    /// Failed to sign a token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,

    /// Signature, issuer or format check failed
    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// Authenticated identity of the current request
///
/// Inserted into request extensions by the session middleware; handlers
/// receive it as an extractor (`Session` or `Option<Session>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }
}

/// JWT claims of a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - account email
    pub sub: String,

    pub role: Role,

    pub iss: String,

    pub iat: i64,

    pub exp: i64,

    pub nbf: i64,
}

impl SessionClaims {
    /// Claims for `session` expiring after `ttl`
    pub fn new(session: &Session, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: session.email.clone(),
            role: session.role,
            iss: SESSION_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Signs a session token for `session`
pub fn issue_session_token(
    session: &Session,
    secret: &str,
    ttl: Duration,
) -> Result<String, SessionError> {
    let claims = SessionClaims::new(session, ttl);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies signature, issuer and expiry, and returns the session
pub fn decode_session_token(token: &str, secret: &str) -> Result<Session, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::Invalid(e.to_string()),
    })?;

    Ok(Session {
        email: data.claims.sub,
        role: data.claims.role,
    })
}
