/// Session middleware and extractor for Axum
///
/// The middleware reads the session cookie, verifies the token and, when it
/// is valid, inserts a [`Session`] into the request extensions. It never
/// rejects a request: a missing or bad cookie simply leaves the request
/// unauthenticated, and each handler decides whether that is acceptable by
/// extracting `Session` (required) or `Option<Session>` (optional).
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use rentease_shared::auth::{middleware::create_session_middleware, session::Session};
///
/// async fn whoami(session: Session) -> String {
///     format!("{} ({})", session.email, session.role)
/// }
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(create_session_middleware(
///         "a-session-secret-of-at-least-32-bytes".to_string(),
///     )));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use cookie::{Cookie, SameSite};
use std::sync::Arc;

use super::session::{decode_session_token, Session, SessionError};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "rentease_session";

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(SessionError::Missing)
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            SessionError::CreateError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            _ => (StatusCode::UNAUTHORIZED, "unauthorized"),
        };

        let body = Json(serde_json::json!({
            "error": error,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Reads the session token from the `Cookie` header
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds the cookie that carries a freshly issued session token
pub fn session_cookie(token: String, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Builds a cookie that makes the browser drop the session
pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}

/// Session middleware
///
/// Resolves the session cookie into a [`Session`] request extension.
pub async fn session_middleware(secret: Arc<str>, mut req: Request, next: Next) -> Response {
    if let Some(token) = session_token_from_headers(req.headers()) {
        match decode_session_token(&token, &secret) {
            Ok(session) => {
                req.extensions_mut().insert(session);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
            }
        }
    }

    next.run(req).await
}

/// Creates a session middleware closure that owns the signing secret
pub fn create_session_middleware(
    secret: String,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>> + Clone
{
    let secret: Arc<str> = Arc::from(secret);
    move |req, next| {
        let secret = secret.clone();
        Box::pin(session_middleware(secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::issue_session_token;
    use crate::models::Role;
    use axum::{body::Body, http::HeaderValue, routing::get, Router};
    use tower::ServiceExt;

    const SECRET: &str = "test-session-secret-at-least-32-bytes";

    async fn whoami(session: Option<Session>) -> String {
        match session {
            Some(s) => format!("{}:{}", s.email, s.role),
            None => "anonymous".to_string(),
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route("/required", get(|s: Session| async move { s.email }))
            .layer(axum::middleware::from_fn(create_session_middleware(SECRET.to_string())))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; rentease_session=abc.def.ghi"),
        );
        assert_eq!(session_token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(session_token_from_headers(&headers).is_none());
        assert!(session_token_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let rendered = session_cookie("tok".to_string(), chrono::Duration::hours(1), false).to_string();
        assert!(rendered.starts_with("rentease_session=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=3600"));
        assert!(!rendered.contains("Secure"));

        let cleared = expired_session_cookie(true).to_string();
        assert!(cleared.contains("Max-Age=0"));
        assert!(cleared.contains("Secure"));
    }

    #[tokio::test]
    async fn test_valid_cookie_populates_session() {
        let token = issue_session_token(
            &Session::new("landlord@x.com", Role::Landlord),
            SECRET,
            chrono::Duration::hours(1),
        )
        .unwrap();

        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "landlord@x.com:landlord");
    }

    #[tokio::test]
    async fn test_bad_cookie_is_anonymous() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .header(header::COOKIE, "rentease_session=forged")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_required_session_rejects_with_401() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/required")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
