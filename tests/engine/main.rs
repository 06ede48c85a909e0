//! Integration tests for the switchboard_engine crate.
//!
//! Tests for whole-message dispatch:
//! - Gate, toggles and botbans
//! - Rate limits
//! - Built-in commands

mod builtin_tests;
mod gating_tests;
mod support;
