/// Landlord endpoints
///
/// # Endpoints
///
/// - `GET /api/landlords` - Every registered landlord email (public)
/// - `GET /api/landlord/tenants` - The landlord's tenants and payment status
/// - `GET /api/landlord/info` - The landlord's profile
/// - `POST /api/landlord/settings` - Update the profile (multipart)

use super::{
    auth::MessageResponse,
    settings::{apply_settings, ensure_account_role, SettingsForm},
};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Multipart, State},
    Json,
};
use rentease_shared::{
    auth::session::Session,
    models::{Role, TenantSummary},
};
use serde::Serialize;

/// Landlord profile
#[derive(Debug, Serialize)]
pub struct LandlordInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

/// List landlord emails for the registration form
pub async fn list_landlords(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.relationships.list_landlord_emails().await?))
}

/// List the logged-in landlord's tenants
///
/// ```json
/// [{"name": "tenant@x.com", "status": "overdue", "house_type": null}]
/// ```
pub async fn list_tenants(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Vec<TenantSummary>>> {
    Ok(Json(state.relationships.list_tenants_for(&session).await?))
}

/// Profile of the logged-in landlord
pub async fn landlord_info(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<LandlordInfo>> {
    ensure_account_role(&session, Role::Landlord)?;
    let landlord = state.identity.profile(&session).await?;

    Ok(Json(LandlordInfo {
        first_name: landlord.first_name,
        last_name: landlord.last_name,
        email: landlord.email,
        phone: landlord.phone,
    }))
}

/// Update the logged-in landlord's settings
pub async fn update_settings(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    ensure_account_role(&session, Role::Landlord)?;

    let form = SettingsForm::read(multipart).await?;
    apply_settings(&state, &session, form).await?;

    Ok(MessageResponse::new("Settings updated successfully"))
}
