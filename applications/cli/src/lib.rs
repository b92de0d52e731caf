//! Elementa CLI Library
//!
//! Configuration, catalog loading and output formatting for the `elementa` binary,
//! exposed for testing.

pub mod catalog;
pub mod config;
pub mod display;

pub use config::{AppConfig, ConfigError};
