//! Kush.Observer authentication gateway
//!
//! Verifies callers against the identity provider, refreshes expired
//! sessions once, and degrades to a legacy endpoint when authentication
//! fails.

pub mod api;
mod app;
pub mod core;
pub mod utils;
