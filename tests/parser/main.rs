//! Integration tests for the switchboard_parser crate.
//!
//! Tests for the command text pipeline:
//! - Tokenization and the remainder cursor
//! - Command tree resolution
//! - Argument binding with simple and manual converters

mod binding_tests;
mod resolution_tests;
mod tokenizer_tests;
