/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /register` - Create a landlord or tenant account
/// - `GET /login` - Login page notice (target of the dashboard redirect)
/// - `POST /login` - Check credentials and set the session cookie
/// - `POST /logout` - Clear the session cookie
/// - `POST /request_reset` - Issue a password reset token
/// - `POST /reset_password` - Set a new password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rentease_shared::{
    auth::{
        middleware::{expired_session_cookie, session_cookie},
        session::{issue_session_token, Session},
    },
    identity::Registration,
    models::Role,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    pub confirm_password: String,

    pub role: Role,

    /// Landlord to attach a tenant to
    #[serde(default)]
    pub landlord_email: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,

    pub role: Role,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,

    pub password: String,
}

/// Query string of the login page
#[derive(Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    #[serde(default)]
    pub notice: Option<String>,
}

/// Login page payload
#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub message: String,

    /// Set when the visitor was bounced from a dashboard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,

    /// Which dashboard the client should open
    pub role: Role,
}

/// Password reset request
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// Password reset token response
#[derive(Debug, Serialize)]
pub struct ResetTokenResponse {
    pub message: String,

    pub token: String,

    pub expires_at: DateTime<Utc>,
}

/// New password submission
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,

    pub new_password: String,

    pub confirm_password: String,
}

/// Plain message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/json
///
/// {
///   "email": "tenant@x.com",
///   "password": "password123",
///   "confirm_password": "password123",
///   "role": "tenant",
///   "landlord_email": "landlord@x.com"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"message": "Registration successful!", "role": "tenant"}`.
///
/// # Errors
///
/// - `400`: invalid email, mismatched confirmation, password under 8 characters
/// - `409`: email already registered for that role
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    let role = state
        .identity
        .register(Registration {
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
            role: req.role,
            landlord_email: req.landlord_email,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful!".to_string(),
            role,
        }),
    ))
}

/// Log in
///
/// On success the response carries a `Set-Cookie` header with the signed
/// session. Unknown emails and wrong passwords get the same `401`.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Response> {
    let session = state.identity.login(&req.email, &req.password).await?;

    let ttl = state.config.session_ttl();
    let token = issue_session_token(&session, state.session_secret(), ttl)?;
    let cookie = session_cookie(token, ttl, state.config.api.production);

    let body = Json(LoginResponse {
        message: "Login successful".to_string(),
        role: session.role,
    });

    Ok(([(header::SET_COOKIE, cookie.to_string())], body).into_response())
}

/// Login page
///
/// Dashboards redirect here with `?notice=access_denied` when the session
/// is missing or holds the other role.
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPage> {
    let notice = query.notice.as_deref().map(|notice| match notice {
        "access_denied" => {
            "Access Denied. You do not have permission to view this page".to_string()
        }
        other => other.to_string(),
    });

    Json(LoginPage {
        message: "Please log in".to_string(),
        notice,
    })
}

/// Log out
///
/// Always succeeds; the session cookie is overwritten with an expired one.
pub async fn logout(State(state): State<AppState>, session: Option<Session>) -> Response {
    if let Some(session) = session {
        tracing::info!(email = %session.email, role = %session.role, "User logged out");
    }

    let cookie = expired_session_cookie(state.config.api.production);
    (
        [(header::SET_COOKIE, cookie.to_string())],
        MessageResponse::new("Logged out"),
    )
        .into_response()
}

/// Issue a password reset token
///
/// The token is returned in the response body; there is no email delivery.
///
/// # Errors
///
/// - `404`: no account with that email
pub async fn request_reset(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetRequest>,
) -> ApiResult<Json<ResetTokenResponse>> {
    let reset = state.identity.request_password_reset(&req.email).await?;

    Ok(Json(ResetTokenResponse {
        message: "Password reset token generated".to_string(),
        token: reset.token,
        expires_at: reset.expires_at,
    }))
}

/// Set a new password
///
/// # Errors
///
/// - `400`: mismatched confirmation or password under 8 characters
/// - `404`: no account with that email
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required.".to_string()));
    }

    state
        .identity
        .complete_password_reset(&req.email, &req.new_password, &req.confirm_password)
        .await?;

    Ok(MessageResponse::new("Password reset successful!"))
}
