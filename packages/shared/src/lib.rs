//! Utilities shared between the Kyodo server and client.

pub mod logger;
pub mod time;
