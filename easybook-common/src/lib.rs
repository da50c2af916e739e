//! # Easy Booking Common Library
//!
//! Shared code for the iAircon Easy Booking back-office services:
//! - Common error type
//! - TOML configuration loading with environment overrides
//! - Import event types and the broadcast EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
