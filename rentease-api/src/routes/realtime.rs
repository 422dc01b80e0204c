/// Dashboard WebSocket
///
/// `GET /ws` upgrades to a WebSocket that carries JSON frames of the form
/// `{"event": <name>, "data": <payload>}`.
///
/// Server to client:
/// - `update_dashboard`: a payment submitted through `/pay`
/// - `payment_update`: a `rent_payment` relayed from any client
///
/// Client to server:
/// - `join_dashboard`: accepted, no effect
/// - `rent_payment`: re-broadcast to every client as `payment_update`
///
/// Each connection subscribes to the payment broadcaster; a client that
/// falls too far behind skips the events it missed.

use crate::app::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use rentease_shared::{auth::session::Session, notifications::PaymentBroadcaster};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Frame sent by a dashboard client
#[derive(Debug, Deserialize)]
pub struct ClientFrame {
    pub event: String,

    #[serde(default)]
    pub data: Value,
}

/// Upgrade to the dashboard WebSocket
///
/// Anonymous connections are allowed; the session, when present, only
/// labels the connection in logs.
pub async fn dashboard_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    session: Option<Session>,
) -> Response {
    let who = session.map(|s| s.email);
    ws.on_upgrade(move |socket| handle_socket(socket, state.broadcaster, who))
}

async fn handle_socket(socket: WebSocket, broadcaster: PaymentBroadcaster, who: Option<String>) {
    let who = who.unwrap_or_else(|| "anonymous".to_string());
    info!(client = %who, subscribers = broadcaster.subscriber_count() + 1, "Client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut events = broadcaster.subscribe();

    // Broadcast -> client
    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Dashboard client lagged, events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode dashboard event");
                    continue;
                }
            };

            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Client -> broadcast
    let relay = broadcaster.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => handle_client_frame(&relay, &text),
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!(client = %who, "Client disconnected");
}

/// Dispatches one client frame
pub fn handle_client_frame(broadcaster: &PaymentBroadcaster, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "Ignoring malformed client frame");
            return;
        }
    };

    match frame.event.as_str() {
        "join_dashboard" => debug!(data = %frame.data, "Client joined dashboard"),
        "rent_payment" => {
            info!(data = %frame.data, "Received payment update");
            broadcaster.relay(frame.data);
        }
        other => debug!(event = %other, "Ignoring unknown client event"),
    }
}
