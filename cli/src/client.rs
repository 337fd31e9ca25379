//! WebSocket client for the Lineroom server

use anyhow::{anyhow, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::messages::{ClientMessage, ServerMessage, Snapshot, Vote};

/// WebSocket client for Lineroom
pub struct LineClient {
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<ServerMessage>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl LineClient {
    /// Connect to a Lineroom server
    pub async fn connect(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| anyhow!("Invalid server URL: {}", e))?;
        tracing::info!("Connecting to {}", url);

        let (ws_stream, _) = connect_async(url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        // Channel for outgoing messages
        let (out_tx, mut out_rx) = mpsc::channel::<Message>(32);

        // Channel for incoming parsed messages
        let (in_tx, in_rx) = mpsc::channel::<ServerMessage>(32);

        // Spawn task to handle WebSocket communication
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Handle outgoing messages
                    Some(msg) = out_rx.recv() => {
                        if write.send(msg).await.is_err() {
                            break;
                        }
                    }
                    // Handle incoming messages
                    Some(result) = read.next() => {
                        match result {
                            Ok(Message::Text(text)) => {
                                match serde_json::from_str::<ServerMessage>(&text) {
                                    Ok(msg) => {
                                        if in_tx.send(msg).await.is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        tracing::warn!("Failed to parse message: {} - {}", e, text);
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Err(e) => {
                                tracing::error!("WebSocket error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    else => break,
                }
            }
        });

        tracing::info!("Connected successfully");

        Ok(Self {
            tx: out_tx,
            rx: in_rx,
            handle,
        })
    }

    /// Send a message to the server
    async fn send(&self, msg: ClientMessage) -> Result<()> {
        let json = serde_json::to_string(&msg)?;
        self.tx
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| anyhow!("Failed to send message: {}", e))
    }

    /// Receive a message from the server
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.rx.recv().await
    }

    /// Try to receive a message without blocking
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        self.rx.try_recv().ok()
    }

    /// Create a new room and return its identifier
    pub async fn create_room(&mut self) -> Result<String> {
        self.send(ClientMessage::CreateRoom).await?;

        while let Some(msg) = self.recv().await {
            match msg {
                ServerMessage::RoomCreated { room_id } => return Ok(room_id),
                ServerMessage::Error { message } => {
                    return Err(anyhow!("Server error: {}", message));
                }
                _ => continue,
            }
        }

        Err(anyhow!("Connection closed"))
    }

    /// Join a room with a display name
    pub async fn join(&mut self, room_id: &str, name: &str) -> Result<Snapshot> {
        self.send(ClientMessage::Join {
            room_id: room_id.to_string(),
            name: name.to_string(),
        })
        .await?;

        self.await_snapshot().await
    }

    /// Cast a vote in a room
    pub async fn cast_vote(&mut self, room_id: &str, name: &str, vote: Vote) -> Result<Snapshot> {
        self.send(ClientMessage::CastVote {
            room_id: room_id.to_string(),
            name: name.to_string(),
            vote,
        })
        .await?;

        self.await_snapshot().await
    }

    /// Get the current snapshot of a room
    pub async fn snapshot(&mut self, room_id: &str) -> Result<Snapshot> {
        self.send(ClientMessage::Snapshot {
            room_id: room_id.to_string(),
        })
        .await?;

        self.await_snapshot().await
    }

    /// Subscribe to live updates for a room
    pub async fn subscribe(&mut self, room_id: &str) -> Result<()> {
        self.send(ClientMessage::Subscribe {
            room_id: room_id.to_string(),
        })
        .await?;

        while let Some(msg) = self.recv().await {
            match msg {
                ServerMessage::Subscribed { .. } => return Ok(()),
                ServerMessage::Error { message } => {
                    return Err(anyhow!("Server error: {}", message));
                }
                _ => continue,
            }
        }

        Err(anyhow!("Connection closed"))
    }

    /// Listen for events until callback returns false
    pub async fn listen<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(ServerMessage) -> bool,
    {
        while let Some(msg) = self.recv().await {
            if !callback(msg) {
                break;
            }
        }
        Ok(())
    }

    /// Wait for the next snapshot reply, surfacing server errors
    async fn await_snapshot(&mut self) -> Result<Snapshot> {
        while let Some(msg) = self.recv().await {
            match msg {
                ServerMessage::Snapshot(snapshot) => return Ok(snapshot),
                ServerMessage::Error { message } => {
                    return Err(anyhow!("Server error: {}", message));
                }
                _ => continue,
            }
        }

        Err(anyhow!("Connection closed"))
    }
}
