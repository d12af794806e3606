//! WebSocket adapters for real-time maintenance status.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     MaintenanceEventStore                            │
//! │   commit ──▶ StatusBroadcaster::publish (post-commit hook)           │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    BroadcastDispatcher                               │
//! │   - Snapshots the group's members                                    │
//! │   - try_send into each member's bounded queue                        │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      RoomManager                                     │
//! │   maintenance_perma_prod   maintenance_perma_stage                   │
//! │   ├── conn-a               └── conn-c                                │
//! │   └── conn-b                                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     ▼
//!                 ConnectionSession (one per socket) ──▶ client
//! ```
//!
//! # Components
//!
//! - [`messages`] - Outbound message shape
//! - [`rooms`] - Group registry
//! - [`dispatcher`] - Fan-out to group members
//! - [`session`] - Per-connection lifecycle
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod dispatcher;
pub mod handler;
pub mod messages;
pub mod rooms;
pub mod session;

pub use dispatcher::{BroadcastDispatcher, DeliveryError};
pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::GroupMessage;
pub use rooms::{ConnectionHandle, ConnectionId, RoomManager};
pub use session::{ConnectionSession, Outbox, SessionState};
