//! Unit tests for hoist CLI
//!
//! These tests drive the provisioning services against an in-memory host and
//! run fast without network or SSH.

mod architecture;
mod property_tests;
