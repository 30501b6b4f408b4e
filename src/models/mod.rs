//! Core data models for experimentkit.
//!
//! - Provider selector and its published defaults
//! - Messages, requests and run results
//! - Configuration and error taxonomy

mod config;
mod error;
mod message;
mod provider;

pub use config::*;
pub use error::*;
pub use message::*;
pub use provider::*;
