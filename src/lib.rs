//! folio_assist: portfolio backend with a Gemini-backed assistant.
//!
//! This library crate re-exports modules so integration tests
//! (under `tests/`) can access them.

pub mod assistant;
pub mod cli;
pub mod config;
pub mod contact;
pub mod gateway;
pub mod logs;
pub mod models;
pub mod utils;
