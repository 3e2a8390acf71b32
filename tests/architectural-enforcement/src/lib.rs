//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce the session core's
//! architectural principles:
//! - The core stays headless: no UI crates, no direct terminal writes
//! - No sleep() calls in production code; the core waits on I/O
//! - Async paths use async I/O, never blocking calls
//!
//! These tests are designed to catch violations early in the development cycle.

#![allow(dead_code)]

pub fn placeholder() {
    // Placeholder to make this a valid library
}
