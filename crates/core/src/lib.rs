//! Core utilities shared by the hamlet crates.
//!
//! This crate provides foundational types and utilities:
//! - Error types and result aliases
//! - Logging initialization
//! - Frame timer
//! - JSON configuration loading
//! - Scalar and vector interpolation helpers

pub mod config;
mod error;
mod logging;
pub mod mathx;
mod timer;

pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::Timer;
