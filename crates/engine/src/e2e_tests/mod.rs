//! End-to-end tests for the world service.
//!
//! These tests validate whole flows using:
//! - The in-memory world behind every repository port
//! - The grant-table evaluator
//! - The in-memory event log as the publisher's sink
//!
//! # Running E2E Tests
//!
//! ```bash
//! cargo test -p mushworld-engine --lib e2e_tests
//! ```

mod exit_tests;
