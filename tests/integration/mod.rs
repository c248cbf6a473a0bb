//! Integration test suite for artifact-deps
//!
//! End-to-end tests that drive [`DependencyResolver`](artifact_deps::resolver::DependencyResolver)
//! against a real workspace directory with the bundled `WorkspaceImporter` and
//! `MemoryModelStore`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **config**: configuration files, discovery and environment overrides
//! - **materialize**: recursive fetch and generation of missing dependencies
//! - **persistence**: JSON snapshots of the recorded tree

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod config;
mod materialize;
mod persistence;
