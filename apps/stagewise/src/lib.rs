//! # Stagewise Library
//!
//! This library exposes the Stagewise command modules for testing and
//! integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export stagewise_core for convenience
pub use stagewise_core;
