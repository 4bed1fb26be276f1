//! Command-line host for the lqbridge runtime.
//!
//! Reads `method {json}` lines from stdin, routes them through
//! [`LiquidBridge::dispatch`](lqbridge::LiquidBridge::dispatch) and prints
//! one reply line per request. Event and log deliveries are printed as they
//! arrive.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with environment variable expansion
//! - [`repl`] - Line parsing, reply formatting and the read loop
//! - [`sig_down`] - Shutdown on SIGINT / SIGTERM

pub mod config;
pub mod repl;
pub mod sig_down;

pub use config::{CliConfig, ConfigError};
pub use sig_down::SigDown;
