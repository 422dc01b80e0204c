/// Simulated rent payment
///
/// # Endpoint
///
/// ```text
/// POST /pay
/// Content-Type: application/json
///
/// {"email": "tenant@x.com", "amount": 500}
/// ```
///
/// No money moves and nothing is stored. A valid payment is announced to
/// every connected dashboard as an `update_dashboard` event.

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{extract::State, Json};
use rentease_shared::notifications::PaymentNotice;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payment request
///
/// Both fields are optional at the JSON level so that a missing one gets the
/// same `400` as an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct PayRequest {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub amount: Option<Value>,
}

/// Payment response
#[derive(Debug, Serialize)]
pub struct PayResponse {
    pub message: String,

    /// The event that was broadcast
    pub notice: PaymentNotice,
}

/// Process a payment
///
/// # Errors
///
/// - `400`: missing or empty email, missing or zero amount
pub async fn pay(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PayRequest>,
) -> ApiResult<Json<PayResponse>> {
    let email = req.email.unwrap_or_default();
    let amount = req.amount.unwrap_or(Value::Null);

    let notice = state.broadcaster.submit_payment(&email, &amount).await?;

    Ok(Json(PayResponse {
        message: "Payment processed successfully".to_string(),
        notice,
    }))
}
