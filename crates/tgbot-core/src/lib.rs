//! Core types for the Telegram Bot API client.
//!
//! This crate has no HTTP dependency. The wire types, the response envelope,
//! configuration and the shared error type live here; the client crate
//! (`tgbot-client`) drives them over a transport.

pub mod config;
pub mod envelope;
pub mod errors;
pub mod logging;
pub mod types;

pub use errors::{Error, Result};
