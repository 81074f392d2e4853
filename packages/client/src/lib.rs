//! Kyodo CLI collaboration client.
//!
//! Keeps a local mirror of one room (code, language, participants, cursors)
//! and drives it from a line-editor prompt.

pub mod command;
pub mod debounce;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod mirror;
mod runner;
mod session;
mod ui;

pub use runner::{ClientConfig, run_client};
