//! HTTP transport
//!
//! Thin wrapper over `reqwest` used by every outbound call of the API
//! client. It performs exactly one attempt per `send`; recovery decisions
//! (refresh and retry after a 401) belong to the API layer.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
