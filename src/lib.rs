//! artifact-deps - dependency discovery and resolution for imported artifacts
//!
//! When a structured artifact (an XML Schema, a WSDL document) is imported into
//! a workspace, it is parsed into a model tree. Artifacts refer to each other
//! through import, include and redefine directives. This crate finds those
//! references, resolves each to a canonical path in the workspace's model
//! tree, records the outcome, and fetches and generates every target that has
//! not been materialized yet, recursively, so that a whole graph of related
//! artifacts ends up in the workspace from a single call.
//!
//! # Architecture Overview
//!
//! The resolution engine is surrounded by collaborators it only knows through
//! traits:
//! - [`model::ModelStore`] owns the model tree (an arena-backed
//!   [`model::MemoryModelStore`] is bundled)
//! - [`importer::Importer`] fetches bytes and writes them into the workspace
//!   ([`importer::WorkspaceImporter`] handles `http(s)`, `file:` and workspace
//!   paths)
//! - [`generator::ModelGenerator`] turns an imported file into a model tree
//! - [`generator::MetamodelRegistry`] looks up the metamodel to generate with
//!
//! # Core Modules
//!
//! - [`resolver`] - reference classification, relative and absolute
//!   resolution, dependency records and recursive materialization
//! - [`model`] - model tree types and the store abstraction
//! - [`importer`] - fetching and workspace import
//! - [`generator`] - model generation and metamodel lookup
//! - [`config`] - resolver configuration (`~/.artifact-deps/config.toml`)
//! - [`core`] - error types and user-facing error rendering
//! - [`utils`] - file system helpers and retry backoff
//! - [`constants`] - property names and defaults
//!
//! # Recorded Tree
//!
//! For an artifact at `/Model/Books/Books.xsd` importing
//! `./data/types/BookDatatypes.xsd`, processing adds:
//!
//! ```text
//! /Model/Books/Books.xsd
//! └── dependencies
//!     └── dependency1
//!           sourceReference = ["./data/types/BookDatatypes.xsd"]
//!           resolvedPath    = "/Model/Books/data/types/BookDatatypes.xsd"
//! ```
//!
//! # Configuration
//!
//! ```toml
//! # ~/.artifact-deps/config.toml
//! max_depth = 8
//! container_policy = "reuse"
//!
//! [fetch]
//! timeout_secs = 10
//! max_retries = 5
//! ```

pub mod config;
pub mod constants;
pub mod core;
pub mod generator;
pub mod importer;
pub mod model;
pub mod resolver;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
