//! Global constants used throughout the artifact-deps codebase.
//!
//! Property names, node names and numeric limits shared by the resolver,
//! the importer and the bundled model store live here so that the
//! string keys stored in a model tree are defined in exactly one place.

/// Property on a reference node holding the raw reference string.
pub const REFERENCE_LOCATION_PROPERTY: &str = "schemaLocation";

/// Property on an artifact root recording where its bytes were fetched from.
pub const EXTERNAL_ORIGIN_PROPERTY: &str = "externalOrigin";

/// Property on an artifact root naming the metamodel it was generated with.
pub const METAMODEL_ID_PROPERTY: &str = "metamodelId";

/// Property on an artifact root holding the SHA-256 of its imported bytes.
pub const CHECKSUM_PROPERTY: &str = "checksum";

/// Property on a dependency record holding the raw reference strings.
pub const SOURCE_REFERENCE_PROPERTY: &str = "sourceReference";

/// Property on a dependency record holding the resolved model path.
pub const RESOLVED_PATH_PROPERTY: &str = "resolvedPath";

/// Default name of the container node that holds dependency records.
pub const DEFAULT_CONTAINER_NAME: &str = "dependencies";

/// Name prefix for dependency record nodes (`dependency1`, `dependency2`, ...).
pub const DEPENDENCY_RECORD_PREFIX: &str = "dependency";

/// Default bound on recursive materialization of missing dependencies.
///
/// A reference cycle whose members resolve to distinct paths would otherwise
/// recurse without end.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Default timeout for a single HTTP fetch (30 seconds).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default number of retries for a failed HTTP fetch.
pub const DEFAULT_FETCH_RETRIES: u32 = 3;

/// Maximum backoff delay for exponential backoff (500ms).
///
/// Exponential backoff delays are capped at this value to prevent
/// excessive wait times during retry operations.
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Starting delay for exponential backoff (10ms).
///
/// This is the initial delay used in exponential backoff calculations,
/// which doubles on each retry attempt.
pub const STARTING_BACKOFF_DELAY_MS: u64 = 10;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ARTIFACT_DEPS_CONFIG";

/// Environment variable overriding `max_depth`.
pub const MAX_DEPTH_ENV: &str = "ARTIFACT_DEPS_MAX_DEPTH";
