//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - REST endpoints (axum)
//! - `memory` - In-process repositories
//! - `postgres` - sqlx repositories and migrations
//! - `websocket` - Group registry, broadcast dispatcher and subscriber sessions

pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;

pub use memory::InMemoryMaintenanceStore;
pub use websocket::{BroadcastDispatcher, RoomManager};
