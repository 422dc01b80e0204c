/// Multipart settings form shared by the landlord and tenant endpoints
///
/// # Fields
///
/// - `first_name`, `last_name`, `phone`, `house_type` (tenants only)
/// - `current_password` + `new_password`: both non-empty to change the password
/// - `profile_picture`: file, png/jpg/jpeg/gif; anything else is ignored
///
/// Fields that are absent leave the stored value unchanged. The picture is
/// written to disk only after the account update succeeds.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    uploads::PendingUpload,
};
use axum::extract::Multipart;
use rentease_shared::{
    auth::session::Session,
    identity::ProfileUpdate,
    models::{Role, UserRecord},
};
use tracing::debug;

/// Parsed settings form
#[derive(Debug, Default)]
pub struct SettingsForm {
    pub changes: ProfileUpdate,
    pub upload: Option<PendingUpload>,
}

impl SettingsForm {
    /// Reads every field of a multipart settings submission
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = SettingsForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "profile_picture" => {
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form.upload = PendingUpload::accept(file_name.as_deref(), bytes.to_vec());
                }
                "first_name" => form.changes.first_name = Some(field.text().await?),
                "last_name" => form.changes.last_name = Some(field.text().await?),
                "phone" => form.changes.phone = Some(field.text().await?),
                "house_type" => form.changes.house_type = Some(field.text().await?),
                "current_password" => form.changes.current_password = Some(field.text().await?),
                "new_password" => form.changes.new_password = Some(field.text().await?),
                other => debug!(field = %other, "Ignoring unknown settings field"),
            }
        }

        if let Some(upload) = &form.upload {
            form.changes.profile_picture = Some(upload.filename.clone());
        }

        Ok(form)
    }
}

/// Role-specific account routes answer 404 for the other role
pub(crate) fn ensure_account_role(session: &Session, role: Role) -> ApiResult<()> {
    if session.role != role {
        let label = match role {
            Role::Landlord => "Landlord",
            Role::Tenant => "Tenant",
        };
        return Err(ApiError::NotFound(format!("{} not found", label)));
    }
    Ok(())
}

/// Applies the form to the session's account, then stores the picture
pub(crate) async fn apply_settings(
    state: &AppState,
    session: &Session,
    form: SettingsForm,
) -> ApiResult<UserRecord> {
    let updated = state.identity.update_profile(session, form.changes).await?;

    if let Some(upload) = form.upload {
        upload
            .store(&state.config.uploads.dir)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to store upload: {}", e)))?;
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_account_role() {
        let tenant = Session::new("t@x.com", Role::Tenant);
        assert!(ensure_account_role(&tenant, Role::Tenant).is_ok());

        match ensure_account_role(&tenant, Role::Landlord) {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Landlord not found"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
