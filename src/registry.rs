//! Room registry for live voting sessions
//!
//! A room holds the display-name -> vote map and its running tally behind a
//! single lock, so the two can never be observed out of sync. The registry
//! owns the room map under its own lock, independent of per-room locks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{RoomView, Tally, Vote};

/// Events that can occur in a voting room
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// A user joined the room
    UserJoined { name: String },
    /// A vote was cast or changed, with the tally after the mutation
    VoteCast {
        name: String,
        vote: Vote,
        tally: Tally,
    },
}

/// Mutable room state: the per-user vote map and its tally.
///
/// Invariant: `tally.yes_count`/`tally.no_count` equal the number of `users`
/// entries holding `Some(Vote::Yes)`/`Some(Vote::No)`. Both are only ever
/// mutated together under the room's write lock.
struct RoomState {
    users: HashMap<String, Option<Vote>>,
    tally: Tally,
}

/// A voting room, managing participants and the live tally
pub struct Room {
    room_id: String,
    created_at: DateTime<Utc>,
    state: RwLock<RoomState>,
    event_tx: broadcast::Sender<RoomEvent>,
}

impl Room {
    fn new(room_id: String) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            room_id,
            created_at: Utc::now(),
            state: RwLock::new(RoomState {
                users: HashMap::new(),
                tally: Tally::default(),
            }),
            event_tx,
        }
    }

    /// Get the room ID
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Subscribe to room events
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.event_tx.subscribe()
    }

    /// Add a user to the room with no vote yet.
    ///
    /// Joining with a name that is already present is a no-op; the existing
    /// vote is left untouched.
    pub async fn join(&self, name: &str) {
        let mut state = self.state.write().await;
        if state.users.contains_key(name) {
            return;
        }
        state.users.insert(name.to_string(), None);

        let _ = self.event_tx.send(RoomEvent::UserJoined {
            name: name.to_string(),
        });
    }

    /// Record a vote for a user, overwriting any previous vote.
    ///
    /// The tally buckets are adjusted in the same write scope, so the tally
    /// invariant holds whether this is a first vote or a change. Returns the
    /// updated tally.
    pub async fn cast_vote(&self, name: &str, vote: Vote) -> Result<Tally> {
        let tally = {
            let mut state = self.state.write().await;
            let previous = match state.users.get_mut(name) {
                Some(entry) => entry.replace(vote),
                None => return Err(AppError::UserNotFound(name.to_string())),
            };

            if let Some(previous) = previous {
                state.tally.decrement(previous);
            }
            state.tally.increment(vote);
            state.tally
        };

        let _ = self.event_tx.send(RoomEvent::VoteCast {
            name: name.to_string(),
            vote,
            tally,
        });

        Ok(tally)
    }

    /// Get an immutable view of the room for display
    pub async fn snapshot(&self) -> RoomView {
        let state = self.state.read().await;
        RoomView {
            room_id: self.room_id.clone(),
            tally: state.tally,
            users: state.users.clone(),
            created_at: self.created_at,
        }
    }

    /// Get the number of users in the room
    pub async fn user_count(&self) -> usize {
        let state = self.state.read().await;
        state.users.len()
    }
}

/// Registry of all active voting rooms
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Create a room under a fresh identifier and return the identifier.
    ///
    /// Identifiers are short truncated UUIDs; on the off chance one collides
    /// with a live room, generation retries rather than overwriting.
    pub async fn create_room(&self) -> String {
        let mut rooms = self.rooms.write().await;
        loop {
            let room_id = new_room_id();
            if rooms.contains_key(&room_id) {
                continue;
            }
            rooms.insert(room_id.clone(), Arc::new(Room::new(room_id.clone())));
            return room_id;
        }
    }

    /// Get a room if it exists
    pub async fn get(&self, room_id: &str) -> Result<Arc<Room>> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))
    }

    /// Join a room, registering the display name with no vote yet
    pub async fn join(&self, room_id: &str, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(AppError::BadRequest("Display name is empty".to_string()));
        }
        let room = self.get(room_id).await?;
        room.join(name).await;
        Ok(())
    }

    /// Cast a vote in a room and return the updated tally
    pub async fn cast_vote(&self, room_id: &str, name: &str, vote: Vote) -> Result<Tally> {
        let room = self.get(room_id).await?;
        room.cast_vote(name, vote).await
    }

    /// Get the current view of a room
    pub async fn snapshot(&self, room_id: &str) -> Result<RoomView> {
        let room = self.get(room_id).await?;
        Ok(room.snapshot().await)
    }

    /// Subscribe to a room's event feed
    pub async fn subscribe(&self, room_id: &str) -> Result<broadcast::Receiver<RoomEvent>> {
        let room = self.get(room_id).await?;
        Ok(room.subscribe())
    }

    /// Get the number of active rooms
    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Short opaque room identifier: a v4 UUID truncated to 6 hex characters
fn new_room_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..6].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Count of users holding each vote, recomputed from the map
    async fn recount(room: &Room) -> Tally {
        let view = room.snapshot().await;
        let mut tally = Tally::default();
        for vote in view.users.values().flatten() {
            tally.increment(*vote);
        }
        tally
    }

    #[test]
    fn test_room_id_shape() {
        let id = new_room_id();
        assert_eq!(id.len(), 6);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_create_room_starts_empty() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;

        let view = registry.snapshot(&room_id).await.unwrap();
        assert_eq!(view.room_id, room_id);
        assert!(view.users.is_empty());
        assert_eq!(view.tally, Tally::default());
    }

    #[tokio::test]
    async fn test_create_room_unique_ids() {
        let registry = RoomRegistry::new();
        let a = registry.create_room().await;
        let b = registry.create_room().await;

        assert_ne!(a, b);
        assert_eq!(registry.room_count().await, 2);
    }

    #[tokio::test]
    async fn test_join_nonexistent_room() {
        let registry = RoomRegistry::new();
        let result = registry.join("nosuch", "Alice").await;
        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_vote_in_nonexistent_room() {
        let registry = RoomRegistry::new();
        let result = registry.cast_vote("nosuch", "Alice", Vote::Yes).await;
        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_snapshot_of_nonexistent_room() {
        let registry = RoomRegistry::new();
        let result = registry.snapshot("nosuch").await;
        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_vote_before_join() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;

        let result = registry.cast_vote(&room_id, "Alice", Vote::Yes).await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_join_with_empty_name() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;

        let result = registry.join(&room_id, "").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_join_registers_unvoted_user() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;

        registry.join(&room_id, "Alice").await.unwrap();

        let view = registry.snapshot(&room_id).await.unwrap();
        assert_eq!(view.users.len(), 1);
        assert_eq!(view.users["Alice"], None);
        assert_eq!(view.tally, Tally::default());
    }

    #[tokio::test]
    async fn test_rejoin_is_noop() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;

        registry.join(&room_id, "Alice").await.unwrap();
        registry.cast_vote(&room_id, "Alice", Vote::Yes).await.unwrap();

        // Joining again must not clear the existing vote
        registry.join(&room_id, "Alice").await.unwrap();

        let view = registry.snapshot(&room_id).await.unwrap();
        assert_eq!(view.users.len(), 1);
        assert_eq!(view.users["Alice"], Some(Vote::Yes));
        assert_eq!(view.tally, Tally { yes_count: 1, no_count: 0 });
    }

    #[tokio::test]
    async fn test_first_vote_updates_tally() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;
        registry.join(&room_id, "Alice").await.unwrap();

        let tally = registry.cast_vote(&room_id, "Alice", Vote::Yes).await.unwrap();
        assert_eq!(tally, Tally { yes_count: 1, no_count: 0 });
    }

    #[tokio::test]
    async fn test_vote_change_moves_one_count() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;
        registry.join(&room_id, "Alice").await.unwrap();

        registry.cast_vote(&room_id, "Alice", Vote::Yes).await.unwrap();
        let tally = registry.cast_vote(&room_id, "Alice", Vote::No).await.unwrap();

        assert_eq!(tally, Tally { yes_count: 0, no_count: 1 });
        assert_eq!(tally.total(), 1);
    }

    #[tokio::test]
    async fn test_revote_same_side_is_stable() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;
        registry.join(&room_id, "Alice").await.unwrap();

        registry.cast_vote(&room_id, "Alice", Vote::Yes).await.unwrap();
        let tally = registry.cast_vote(&room_id, "Alice", Vote::Yes).await.unwrap();

        assert_eq!(tally, Tally { yes_count: 1, no_count: 0 });
    }

    #[tokio::test]
    async fn test_tally_matches_user_map() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;
        let room = registry.get(&room_id).await.unwrap();

        for name in ["Alice", "Bob", "Carol", "Dave"] {
            registry.join(&room_id, name).await.unwrap();
        }
        registry.cast_vote(&room_id, "Alice", Vote::Yes).await.unwrap();
        registry.cast_vote(&room_id, "Bob", Vote::No).await.unwrap();
        registry.cast_vote(&room_id, "Carol", Vote::Yes).await.unwrap();
        registry.cast_vote(&room_id, "Alice", Vote::No).await.unwrap();

        let view = registry.snapshot(&room_id).await.unwrap();
        assert_eq!(view.tally, recount(&room).await);
        // Dave never voted
        assert_eq!(view.tally.total(), 3);
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let registry = RoomRegistry::new();
        let a = registry.create_room().await;
        let b = registry.create_room().await;

        registry.join(&a, "Alice").await.unwrap();
        registry.cast_vote(&a, "Alice", Vote::Yes).await.unwrap();

        let view = registry.snapshot(&b).await.unwrap();
        assert!(view.users.is_empty());
        assert_eq!(view.tally, Tally::default());
    }

    #[tokio::test]
    async fn test_join_event() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;
        let mut rx = registry.subscribe(&room_id).await.unwrap();

        registry.join(&room_id, "Alice").await.unwrap();

        let event = rx.try_recv().unwrap();
        match event {
            RoomEvent::UserJoined { name } => assert_eq!(name, "Alice"),
            _ => panic!("Expected UserJoined event"),
        }
    }

    #[tokio::test]
    async fn test_rejoin_sends_no_event() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;

        registry.join(&room_id, "Alice").await.unwrap();

        let mut rx = registry.subscribe(&room_id).await.unwrap();
        registry.join(&room_id, "Alice").await.unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_vote_event_carries_tally() {
        let registry = RoomRegistry::new();
        let room_id = registry.create_room().await;
        registry.join(&room_id, "Alice").await.unwrap();

        let mut rx = registry.subscribe(&room_id).await.unwrap();
        registry.cast_vote(&room_id, "Alice", Vote::No).await.unwrap();

        let event = rx.try_recv().unwrap();
        match event {
            RoomEvent::VoteCast { name, vote, tally } => {
                assert_eq!(name, "Alice");
                assert_eq!(vote, Vote::No);
                assert_eq!(tally, Tally { yes_count: 0, no_count: 1 });
            }
            _ => panic!("Expected VoteCast event"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_votes_stay_consistent() {
        let registry = Arc::new(RoomRegistry::new());
        let room_id = registry.create_room().await;

        let names: Vec<String> = (0..16).map(|i| format!("user{}", i)).collect();
        for name in &names {
            registry.join(&room_id, name).await.unwrap();
        }

        let mut handles = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let registry = Arc::clone(&registry);
            let room_id = room_id.clone();
            let name = name.clone();
            let vote = if i % 2 == 0 { Vote::Yes } else { Vote::No };
            handles.push(tokio::spawn(async move {
                registry.cast_vote(&room_id, &name, vote).await.unwrap();
                // Everyone flips once as well
                let flipped = match vote {
                    Vote::Yes => Vote::No,
                    Vote::No => Vote::Yes,
                };
                registry.cast_vote(&room_id, &name, flipped).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let room = registry.get(&room_id).await.unwrap();
        let view = registry.snapshot(&room_id).await.unwrap();
        assert_eq!(view.tally, recount(&room).await);
        assert_eq!(view.tally.total(), 16);
        assert_eq!(view.tally, Tally { yes_count: 8, no_count: 8 });
    }
}
