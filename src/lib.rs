//! cityfinder-rs
//! =============
//!
//! Umbrella crate for the workspace: re-exports [`cityfinder_core`] so the
//! demos under `demos/` can be run from the repository root
//! (`cargo run --example basic_usage`).

pub use cityfinder_core::*;
