/// Dashboard pages
///
/// Both routes sit behind the role gate, so the session is always present
/// and holds the right role by the time a handler runs.

use axum::Json;
use rentease_shared::auth::session::Session;
use serde::Serialize;

/// Dashboard page payload
#[derive(Debug, Serialize)]
pub struct DashboardPage {
    /// `landlord` or `tenant`
    pub dashboard: String,

    pub email: String,
}

fn page(session: Session) -> Json<DashboardPage> {
    Json(DashboardPage {
        dashboard: session.role.to_string(),
        email: session.email,
    })
}

/// `GET /dashboard/landlord`
pub async fn landlord_dashboard(session: Session) -> Json<DashboardPage> {
    page(session)
}

/// `GET /dashboard/tenant`
pub async fn tenant_dashboard(session: Session) -> Json<DashboardPage> {
    page(session)
}
