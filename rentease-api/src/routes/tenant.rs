/// Tenant endpoints
///
/// # Endpoints
///
/// - `GET /api/tenant/info` - The tenant's profile
/// - `POST /api/tenant/settings` - Update the profile (multipart, accepts `house_type`)

use super::{
    auth::MessageResponse,
    settings::{apply_settings, ensure_account_role, SettingsForm},
};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Multipart, State},
    Json,
};
use rentease_shared::{auth::session::Session, models::Role};
use serde::Serialize;

/// Tenant profile
#[derive(Debug, Serialize)]
pub struct TenantInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub house_type: Option<String>,
}

/// Profile of the logged-in tenant
pub async fn tenant_info(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<TenantInfo>> {
    ensure_account_role(&session, Role::Tenant)?;
    let tenant = state.identity.profile(&session).await?;

    Ok(Json(TenantInfo {
        first_name: tenant.first_name,
        last_name: tenant.last_name,
        email: tenant.email,
        phone: tenant.phone,
        house_type: tenant.house_type,
    }))
}

/// Update the logged-in tenant's settings
pub async fn update_settings(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    ensure_account_role(&session, Role::Tenant)?;

    let form = SettingsForm::read(multipart).await?;
    apply_settings(&state, &session, form).await?;

    Ok(MessageResponse::new("Settings updated successfully"))
}
