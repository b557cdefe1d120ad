//! `setlist-cli` library crate.
//!
//! Re-exports the command implementations for integration testing. The
//! binary entrypoint lives in `main.rs`.

pub mod commands;
