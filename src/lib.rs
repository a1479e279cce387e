//! # courier-client
//!
//! Rust client SDK for the courier multi-role delivery platform backend.
//! Covers the non-UI core of the front-end: token-based auth and session
//! lifecycle, a thin REST client, lazy per-role profile resolution, route
//! guarding, an in-memory notification queue, and translation lookup.
//!
//! DESIGN
//! ======
//! State is split by domain (`session`, `state::profiles`,
//! `state::notifications`, `i18n`, ...) and owned by a single [`Client`]
//! aggregate. Persistence goes through an explicit [`storage::Storage`]
//! abstraction instead of implicit store subscribers, and state changes are
//! observable through a broadcast [`state::StateEvent`] channel.

pub mod client;
pub mod config;
pub mod guard;
pub mod i18n;
pub mod net;
pub mod session;
pub mod state;
pub mod storage;
pub mod util;

#[cfg(test)]
pub(crate) mod testutil;

pub use client::Client;
pub use config::ClientConfig;
pub use net::api::ApiError;
pub use state::StateEvent;
