//! Report snapshot command line library.
//!
//! - Exit codes for CLI operations
//! - Configuration loading and validation
//! - Logging setup
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod exit_codes;
pub mod logging;
