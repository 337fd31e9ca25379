//! Data models for rooms, votes, and tallies

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::moneyline::MoneyLine;

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
            _ => Err(format!("Invalid vote: {}", s)),
        }
    }
}

/// Vote counts for a room, always consistent with the per-user vote map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes_count: u32,
    pub no_count: u32,
}

impl Tally {
    pub fn total(&self) -> u32 {
        self.yes_count + self.no_count
    }

    /// Move one count out of a vote's bucket
    pub fn decrement(&mut self, vote: Vote) {
        match vote {
            Vote::Yes => self.yes_count -= 1,
            Vote::No => self.no_count -= 1,
        }
    }

    /// Move one count into a vote's bucket
    pub fn increment(&mut self, vote: Vote) {
        match vote {
            Vote::Yes => self.yes_count += 1,
            Vote::No => self.no_count += 1,
        }
    }
}

/// Immutable view of a room for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub room_id: String,
    pub tally: Tally,
    /// Display name -> vote; `None` means joined but not voted yet
    pub users: HashMap<String, Option<Vote>>,
    pub created_at: DateTime<Utc>,
}

/// Request to join a room
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: String,
}

/// Request to cast a vote
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub name: String,
    pub vote: Vote,
}

/// Response to room creation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// Room view plus the money line derived from its tally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub room_id: String,
    pub tally: Tally,
    pub users: HashMap<String, Option<Vote>>,
    pub money_line: MoneyLine,
}

impl From<RoomView> for SnapshotResponse {
    fn from(view: RoomView) -> Self {
        let money_line = MoneyLine::from_tally(&view.tally);
        Self {
            room_id: view.room_id,
            tally: view.tally,
            users: view.users,
            money_line,
        }
    }
}
