//! Integration tests for hoist CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior. None of
//! them reach a remote host.

mod cli_tests;
mod config_command;
