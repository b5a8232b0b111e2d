//! Realtime notification layer: one-liner emit helpers for the lifecycle
//! events and the SSE endpoint that streams them to connected clients.

pub mod emit;
pub mod sse;
