//! WebSocket message types for the Lineroom protocol
//!
//! These types mirror the server's protocol. Some fields may not be used
//! directly by the CLI but are part of the complete protocol.

#![allow(dead_code)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single binary vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Yes,
    No,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::Yes => "yes",
            Vote::No => "no",
        }
    }
}

impl std::str::FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Vote::Yes),
            "no" => Ok(Vote::No),
            _ => Err(format!("Invalid vote: {} (expected yes or no)", s)),
        }
    }
}

/// Vote counts for a room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes_count: u32,
    pub no_count: u32,
}

/// Money-line odds for both sides
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoneyLine {
    pub yes_line: f64,
    pub no_line: f64,
}

/// Room snapshot with derived money line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub room_id: String,
    pub tally: Tally,
    pub users: HashMap<String, Option<Vote>>,
    pub money_line: MoneyLine,
}

/// Messages from client to server
#[derive(Debug, Serialize)]
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
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Room was created
    RoomCreated { room_id: String },
    /// Room snapshot (reply to join, cast_vote, and snapshot)
    Snapshot(Snapshot),
    /// Successfully subscribed
    Subscribed { room_id: String },
    /// Pushed after a mutation in a subscribed room
    RoomUpdate(Snapshot),
    /// Error occurred
    Error { message: String },
}
