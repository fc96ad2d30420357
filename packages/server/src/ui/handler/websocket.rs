//! WebSocket connection handlers.
//!
//! Each connection runs two tasks: one reads inbound events strictly in
//! arrival order, the other drains the connection's outbound channel into the
//! socket. The disconnect path runs once both tasks have stopped.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, RelayEventKind, SessionId, Timestamp},
    infrastructure::dto::websocket::{
        InboundEnvelope, OutboundEnvelope, PongPayload, PresencePayload, event,
    },
    ui::state::AppState,
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, JoinSessionUseCase, RelayEventUseCase,
    },
};

/// Reason logged when the peer goes away without a close frame
const TRANSPORT_CLOSE: &str = "transport close";

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection_id = ConnectionIdFactory::generate();
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    // Create a channel for this client to receive messages
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let connect_usecase = ConnectClientUseCase::new(state.repository.clone());
    if let Err(e) = connect_usecase.execute(connection_id.clone(), tx).await {
        tracing::warn!("Rejecting connection '{}': {}", connection_id, e);
        return;
    }
    tracing::info!("Client connected: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();

    let recv_state = state.clone();
    let recv_connection_id = connection_id.clone();

    // Spawn a task to receive events from this client, in order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => return format!("transport error: {e}"),
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&recv_state, &recv_connection_id, text.as_str()).await;
                }
                Message::Binary(_) => {
                    tracing::warn!(
                        "Dropping binary frame from '{}': events must be JSON text",
                        recv_connection_id
                    );
                }
                Message::Close(frame) => {
                    return frame
                        .map(|f| f.reason.as_str().to_string())
                        .filter(|reason| !reason.is_empty())
                        .unwrap_or_else(|| "client close".to_string());
                }
                // Ping/pong frames are answered by the WebSocket layer
                _ => {}
            }
        }
        TRANSPORT_CLOSE.to_string()
    });

    // Spawn a task to forward queued messages to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, stop the other
    let finished_first = tokio::select! {
        result = &mut recv_task => Some(result),
        _ = &mut send_task => None,
    };

    let reason = match finished_first {
        Some(result) => {
            send_task.abort();
            result.unwrap_or_else(|e| format!("receive task failed: {e}"))
        }
        None => {
            // The receive task may be inside a join; wait until it is gone so
            // nothing can re-add this connection after the leave below.
            recv_task.abort();
            match recv_task.await {
                Ok(reason) => reason,
                Err(_) => TRANSPORT_CLOSE.to_string(),
            }
        }
    };

    handle_disconnect(&state, &connection_id, &reason).await;
}

/// Parse one inbound frame and dispatch it by event name.
async fn handle_text(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let envelope = match serde_json::from_str::<InboundEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Dropping malformed frame from '{}': {}", connection_id, e);
            return;
        }
    };

    match envelope.event.as_str() {
        event::JOIN_SESSION => handle_join(state, connection_id, &envelope.data).await,
        event::PING => handle_ping(state, connection_id, envelope.ack_id).await,
        name => match name.parse::<RelayEventKind>() {
            Ok(kind) => handle_relay(state, connection_id, kind, envelope.data).await,
            Err(e) => tracing::warn!("Dropping event from '{}': {}", connection_id, e),
        },
    }
}

async fn handle_join(state: &AppState, connection_id: &ConnectionId, data: &Value) {
    let usecase = JoinSessionUseCase::new(state.repository.clone());
    let transition = match usecase.execute(connection_id, data).await {
        Ok(transition) => transition,
        Err(e) => {
            tracing::warn!("Client '{}': {}", connection_id, e);
            return;
        }
    };

    if let Some(departed) = &transition.departed {
        tracing::info!(
            "Client {} left previous session {}",
            connection_id,
            departed.session_id
        );
        if departed.emptied() {
            tracing::debug!("Session {} is now empty and removed", departed.session_id);
        }
    }
    tracing::info!(
        "Client {} joined session {}",
        connection_id,
        transition.session_id
    );

    let joined = OutboundEnvelope::new(
        event::CLIENT_JOINED,
        presence(connection_id, &transition.session_id),
    );
    if let Some(json) = encode(&joined) {
        deliver(state, &transition.peers, &json).await;
    }
}

async fn handle_relay(
    state: &AppState,
    connection_id: &ConnectionId,
    kind: RelayEventKind,
    data: Value,
) {
    let usecase = RelayEventUseCase::new(state.repository.clone());
    let outcome = match usecase.execute(connection_id, data).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!("Invalid {} data from '{}': {}", kind, connection_id, e);
            return;
        }
    };

    if outcome.targets.is_empty() {
        tracing::debug!(
            "No recipients for {} from '{}' in session {}",
            kind,
            connection_id,
            outcome.session_id
        );
        return;
    }

    tracing::info!(
        "Relaying {} in session {} to {} member(s)",
        kind,
        outcome.session_id,
        outcome.targets.len()
    );
    tracing::debug!("{} payload: {}", kind, outcome.payload);

    let envelope = OutboundEnvelope::new(kind.as_str(), outcome.payload);
    if let Some(json) = encode(&envelope) {
        deliver(state, &outcome.targets, &json).await;
    }
}

/// Reply to the sender only; never broadcast.
async fn handle_ping(state: &AppState, connection_id: &ConnectionId, ack_id: Option<u64>) {
    let pong = OutboundEnvelope::reply(
        event::PONG,
        PongPayload {
            timestamp: Timestamp::now().to_rfc3339(),
            server_id: state.server_id.clone(),
        },
        ack_id,
    );
    if let Some(json) = encode(&pong) {
        deliver(state, std::slice::from_ref(connection_id), &json).await;
    }
}

async fn handle_disconnect(state: &AppState, connection_id: &ConnectionId, reason: &str) {
    tracing::info!(
        "Client disconnected: {}, reason: {}",
        connection_id,
        reason
    );

    let usecase = DisconnectClientUseCase::new(state.repository.clone());
    let Some(departure) = usecase.execute(connection_id).await else {
        return;
    };

    if departure.emptied() {
        tracing::debug!("Session {} is now empty and removed", departure.session_id);
        return;
    }

    let left = OutboundEnvelope::new(
        event::CLIENT_LEFT,
        presence(connection_id, &departure.session_id),
    );
    if let Some(json) = encode(&left) {
        deliver(state, &departure.remaining, &json).await;
    }
    tracing::info!(
        "Broadcasted client-left for '{}' to session {}",
        connection_id,
        departure.session_id
    );
}

fn presence(connection_id: &ConnectionId, session_id: &SessionId) -> PresencePayload {
    PresencePayload {
        client_id: connection_id.as_str().to_string(),
        session_id: session_id.as_str().to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    }
}

fn encode<T: Serialize>(envelope: &OutboundEnvelope<T>) -> Option<String> {
    match envelope.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to encode {} event: {}", envelope.event, e);
            None
        }
    }
}

/// Queue `message` for every target. A failed target does not stop the rest.
async fn deliver(state: &AppState, targets: &[ConnectionId], message: &str) {
    if targets.is_empty() {
        return;
    }

    let clients = state.connected_clients.lock().await;
    for target in targets {
        match clients.get(target) {
            Some(info) => {
                if info.sender.send(message.to_string()).is_err() {
                    tracing::warn!("Failed to send message to client '{}'", target);
                }
            }
            None => tracing::debug!("Client '{}' is no longer connected", target),
        }
    }
}
