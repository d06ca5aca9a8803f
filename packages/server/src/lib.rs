//! Hanashi chat server library.
//!
//! Presence tracking, room membership, fanout and delivery-state reconciliation
//! for real-time 1:1 and group chat over WebSocket, plus the HTTP API that
//! shares the same reconciliation path.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
