/// Role gate for page routes
///
/// Dashboard pages are browser navigations, so a caller without the right
/// role is sent back to the login page instead of getting a JSON error. The
/// session must already be resolved by the session middleware.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use rentease_api::middleware::role_gate::require_role_layer;
/// use rentease_shared::models::Role;
///
/// let pages: Router = Router::new()
///     .route("/dashboard/landlord", get(|| async { "landlord" }))
///     .route_layer(middleware::from_fn(require_role_layer(Role::Landlord)));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rentease_shared::auth::authorization::require_role;
use rentease_shared::auth::session::Session;
use rentease_shared::models::Role;
use std::future::Future;
use std::pin::Pin;

/// Where rejected page requests are sent
pub const ACCESS_DENIED_REDIRECT: &str = "/login?notice=access_denied";

/// Builds middleware that only lets sessions holding `role` through
pub fn require_role_layer(
    role: Role,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let allowed = require_role(req.extensions().get::<Session>(), role).map(|_| ());

            match allowed {
                Ok(()) => next.run(req).await,
                Err(e) => {
                    tracing::info!(path = %req.uri().path(), reason = %e, "Access denied, redirecting to login");
                    access_denied()
                }
            }
        })
    }
}

/// 302 to the login page with an access-denied notice
pub fn access_denied() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, ACCESS_DENIED_REDIRECT)]).into_response()
}
