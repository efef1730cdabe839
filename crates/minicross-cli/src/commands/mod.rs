//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod clues;
pub mod completions;
pub mod pending;
pub mod play;
pub mod profile;
pub mod stats;
pub mod sync;
pub mod validate;
