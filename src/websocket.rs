//! WebSocket server handler
//!
//! Carries the same operations as the HTTP routes over a tagged JSON
//! protocol, plus `subscribe`, which streams a `room_update` message after
//! every committed mutation in the room.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::{SnapshotResponse, Vote};
use crate::registry::RoomEvent;
use crate::AppState;

/// Messages from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a new room
    CreateRoom,
    /// Join a room with a display name
    Join { room_id: String, name: String },
    /// Cast or change a vote
    CastVote {
        room_id: String,
        name: String,
        vote: Vote,
    },
    /// Get the current room snapshot
    Snapshot { room_id: String },
    /// Subscribe to live updates for a room
    Subscribe { room_id: String },
}

/// Messages from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Room was created
    RoomCreated { room_id: String },
    /// Room snapshot (reply to join, cast_vote, and snapshot)
    Snapshot(SnapshotResponse),
    /// Successfully subscribed
    Subscribed { room_id: String },
    /// Pushed after a mutation in a subscribed room
    RoomUpdate(SnapshotResponse),
    /// Error occurred
    Error { message: String },
}

/// WebSocket handler
pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // All outgoing traffic funnels through one channel so subscription tasks
    // can push updates while the main loop replies to requests.
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(32);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut subscriptions: Vec<tokio::task::JoinHandle<()>> = Vec::new();

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
        };

        // Parse client message
        let client_msg: ClientMessage = match serde_json::from_str(&msg) {
            Ok(m) => m,
            Err(e) => {
                let error = ServerMessage::Error {
                    message: format!("Invalid message: {}", e),
                };
                if out_tx.send(error).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let reply = handle_message(client_msg, &state, &out_tx, &mut subscriptions).await;
        if out_tx.send(reply).await.is_err() {
            break;
        }
    }

    for sub in subscriptions {
        sub.abort();
    }
    send_task.abort();
}

async fn handle_message(
    msg: ClientMessage,
    state: &Arc<AppState>,
    out_tx: &mpsc::Sender<ServerMessage>,
    subscriptions: &mut Vec<tokio::task::JoinHandle<()>>,
) -> ServerMessage {
    match msg {
        ClientMessage::CreateRoom => {
            let room_id = state.registry.create_room().await;
            tracing::info!("Created room {}", room_id);
            ServerMessage::RoomCreated { room_id }
        }
        ClientMessage::Join { room_id, name } => {
            match state.registry.join(&room_id, &name).await {
                Ok(()) => snapshot_reply(state, &room_id).await,
                Err(e) => ServerMessage::Error {
                    message: e.to_string(),
                },
            }
        }
        ClientMessage::CastVote {
            room_id,
            name,
            vote,
        } => match state.registry.cast_vote(&room_id, &name, vote).await {
            Ok(_) => snapshot_reply(state, &room_id).await,
            Err(e) => ServerMessage::Error {
                message: e.to_string(),
            },
        },
        ClientMessage::Snapshot { room_id } => snapshot_reply(state, &room_id).await,
        ClientMessage::Subscribe { room_id } => {
            let mut events = match state.registry.subscribe(&room_id).await {
                Ok(events) => events,
                Err(e) => {
                    return ServerMessage::Error {
                        message: e.to_string(),
                    }
                }
            };

            let state = Arc::clone(state);
            let out_tx = out_tx.clone();
            let update_room_id = room_id.clone();
            subscriptions.push(tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(RoomEvent::UserJoined { .. }) | Ok(RoomEvent::VoteCast { .. }) => {
                            let view = match state.registry.snapshot(&update_room_id).await {
                                Ok(view) => view,
                                Err(_) => break,
                            };
                            if out_tx.send(ServerMessage::RoomUpdate(view.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("Subscriber lagged by {} events", n);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            }));

            ServerMessage::Subscribed { room_id }
        }
    }
}

async fn snapshot_reply(state: &Arc<AppState>, room_id: &str) -> ServerMessage {
    match state.registry.snapshot(room_id).await {
        Ok(view) => ServerMessage::Snapshot(view.into()),
        Err(e) => ServerMessage::Error {
            message: e.to_string(),
        },
    }
}
