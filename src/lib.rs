//! Lineroom server - live voting rooms with money-line odds

pub mod error;
pub mod models;
pub mod moneyline;
pub mod registry;
pub mod routes;
pub mod websocket;

use std::sync::Arc;

use crate::registry::RoomRegistry;

/// Application state shared across handlers
pub struct AppState {
    pub registry: RoomRegistry,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            registry: RoomRegistry::new(),
        })
    }
}
