//! WebSocket upgrade handler for maintenance status subscriptions.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Resolve the route's application (404 if unknown, no upgrade)
//! 2. Upgrade to WebSocket
//! 3. Open the connection session (join group, queue current state)
//! 4. Forward group messages out and relay test messages in until disconnect
//! 5. Close the session (leave group)

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream::SplitStream, SinkExt, StreamExt};

use crate::adapters::http::maintenance::ErrorResponse;
use crate::application::{ApplicationCatalog, MaintenanceEventStore};
use crate::config::WebSocketConfig;
use crate::domain::maintenance::{Application, MaintenanceError};

use super::dispatcher::BroadcastDispatcher;
use super::session::ConnectionSession;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub catalog: Arc<ApplicationCatalog>,
    pub events: Arc<MaintenanceEventStore>,
    pub dispatcher: Arc<BroadcastDispatcher>,
    pub config: WebSocketConfig,
}

impl WebSocketState {
    pub fn new(
        catalog: Arc<ApplicationCatalog>,
        events: Arc<MaintenanceEventStore>,
        dispatcher: Arc<BroadcastDispatcher>,
        config: WebSocketConfig,
    ) -> Self {
        Self {
            catalog,
            events,
            dispatcher,
            config,
        }
    }
}

/// Handle WebSocket upgrade requests for one application/tier.
///
/// Route: `GET /ws/:app_slug/:tier`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path((app_slug, tier)): Path<(String, String)>,
    State(state): State<WebSocketState>,
) -> Response {
    let application = match resolve_application(&state.catalog, &app_slug, &tier).await {
        Ok(application) => application,
        Err(refusal) => return refusal,
    };

    ws.max_message_size(state.config.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, application, state))
}

/// Looks up the route's application; refuses the connection when it is unknown.
async fn resolve_application(
    catalog: &ApplicationCatalog,
    app_slug: &str,
    tier: &str,
) -> Result<Application, Response> {
    match catalog.find_by_route(app_slug, tier).await {
        Ok(application) => Ok(application),
        Err(MaintenanceError::NotFound { .. }) => {
            tracing::info!(app_slug = %app_slug, tier = %tier, "Refused connection to unknown application");
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::not_found(
                    "Application",
                    &format!("{} {}", app_slug, tier),
                )),
            )
                .into_response())
        }
        Err(e) => {
            tracing::error!(app_slug = %app_slug, tier = %tier, "Failed to resolve application: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(e.to_string())),
            )
                .into_response())
        }
    }
}

/// Runs for the lifetime of an established connection.
async fn handle_socket(socket: WebSocket, application: Application, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();

    let opened = ConnectionSession::open(
        application,
        &state.events,
        state.dispatcher.clone(),
        state.config.outbound_buffer,
    )
    .await;
    let (mut session, mut outbox) = match opened {
        Ok(opened) => opened,
        Err(e) => {
            tracing::error!("Failed to open connection session: {}", e);
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let connection_id = session.id();

    // Forward group messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbox.next().await {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, "Failed to encode message: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {}
        _ = receive_loop(&mut receiver, &session) => {
            send_task.abort();
        }
    }

    session.close().await;
}

/// Relays inbound text frames until the client goes away.
async fn receive_loop(receiver: &mut SplitStream<WebSocket>, session: &ConnectionSession) {
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                session.relay(&text).await;
            }
            Ok(Message::Binary(_)) => {
                tracing::warn!(connection_id = %session.id(), "Received unsupported binary message");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Protocol-level, answered by axum
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %session.id(), "Client sent close frame");
                break;
            }
            Err(e) => {
                tracing::debug!(connection_id = %session.id(), "Receive error: {}", e);
                break;
            }
        }
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws/:app_slug/:tier", get(ws_handler))
}
