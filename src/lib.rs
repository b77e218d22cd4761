// File: src/lib.rs
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod ics;
pub mod logging;
pub mod model;
pub mod paths;
pub mod runner;
pub mod upcoming;

#[cfg(feature = "tui")]
pub mod tui;
