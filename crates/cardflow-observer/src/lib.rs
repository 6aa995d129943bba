//! Observer API server for Cardflow sessions.
//!
//! Exposes session control (start, stop, pause, resume, speed, config)
//! and observation (status, history, live snapshot stream) over Axum
//! HTTP and `WebSocket` endpoints. Each client identity maps to one
//! session in the shared [`cardflow_core::registry::SessionRegistry`].

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sink;
pub mod state;
pub mod ws;
