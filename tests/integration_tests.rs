//! Integration tests for duckpad.
//!
//! These tests require a `duckdb` binary on PATH; tests that export results
//! additionally require the Arrow community extension to be installable.
//! Tests skip themselves when the environment lacks either.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
