//! REST networking: the HTTP client wrapper and backend wire types.

pub mod api;
pub mod types;
