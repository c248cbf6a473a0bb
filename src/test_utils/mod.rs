//! Test utilities for artifact-deps
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`TreeBuilder`] and [`ArtifactSpec`] build model trees fluently
//! - [`ScriptedGenerator`] generates trees from one-directive-per-line files
//! - [`MapImporter`] serves fetches from memory and imports into a real workspace
//! - [`init_test_logging`] installs a test-friendly tracing subscriber
//!
//! # Example
//!
//! ```rust,no_run
//! use artifact_deps::generator::{Metamodel, StaticMetamodelRegistry};
//! use artifact_deps::resolver::DependencyResolver;
//! use artifact_deps::test_utils::{ArtifactSpec, MapImporter, ScriptedGenerator, TreeBuilder};
//!
//! let workspace = tempfile::TempDir::new().unwrap();
//! let mut tree = TreeBuilder::new();
//! let root = tree.artifact(ArtifactSpec::new("/Movies.xsd").import("MovieDatatypes.xsd")).unwrap();
//!
//! let mut resolver = DependencyResolver::new(
//!     tree.into_store(),
//!     MapImporter::new(workspace.path()),
//!     ScriptedGenerator::new(workspace.path()),
//!     StaticMetamodelRegistry::new().with(Metamodel::new("xsd")),
//! );
//! resolver.process("/Movies.xsd", root).unwrap();
//! ```

pub mod builder;
pub mod generator;
pub mod importer;

pub use builder::{ArtifactSpec, TreeBuilder};
pub use generator::ScriptedGenerator;
pub use importer::MapImporter;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs a subscriber only once regardless of how many times it is called.
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, tests stay
/// silent.
///
/// ```bash
/// RUST_LOG=artifact_deps=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
