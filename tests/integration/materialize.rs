use anyhow::Result;

use artifact_deps::config::ResolverConfig;
use artifact_deps::constants::{CHECKSUM_PROPERTY, EXTERNAL_ORIGIN_PROPERTY};
use artifact_deps::model::{MemoryModelStore, ModelStore};
use artifact_deps::resolver::dependency_records;
use artifact_deps::utils::fs::checksum_bytes;

use crate::common::TestWorkspace;

const BOOKS: &str = "\
# Books schema
import ../common/Common.xsd
include types/BookTypes.xsd
element Book
";

#[test]
fn test_workspace_origin_graph_is_materialized() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write("upstream/common/Common.xsd", "import Base.xsd\nelement Common\n")?;
    workspace.write("upstream/common/Base.xsd", "element Base\n")?;
    workspace.write("upstream/books/types/BookTypes.xsd", "element Isbn\n")?;

    let mut store = MemoryModelStore::new();
    let root =
        workspace.import_root(&mut store, "/Model/books/Books.xsd", "upstream/books/Books.xsd", BOOKS)?;

    let mut resolver = workspace.resolver(store, ResolverConfig::default())?;
    let container = resolver.process("/Model/books/Books.xsd", root)?;
    assert_eq!(container.as_deref(), Some("/Model/books/Books.xsd/dependencies"));

    let store = resolver.store();
    for path in [
        "/Model/common/Common.xsd",
        "/Model/common/Base.xsd",
        "/Model/books/types/BookTypes.xsd",
    ] {
        assert!(store.node_exists(path), "{path} was not generated");
        assert!(workspace.path().join(path.trim_start_matches('/')).is_file());
    }

    let common = store.find("/Model/common/Common.xsd").unwrap();
    let node = store.get_node(common)?;
    assert_eq!(node.text_property(EXTERNAL_ORIGIN_PROPERTY), Some("upstream/common/Common.xsd"));
    assert_eq!(
        node.text_property(CHECKSUM_PROPERTY),
        Some(checksum_bytes(b"import Base.xsd\nelement Common\n").as_str())
    );

    let nested = dependency_records(store, common)?;
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].resolved_path.as_deref(), Some("/Model/common/Base.xsd"));
    assert!(nested[0].exists(store));
    Ok(())
}

#[test]
fn test_missing_upstream_file_leaves_dependency_missing() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write("upstream/common/Common.xsd", "element Common\n")?;

    let mut store = MemoryModelStore::new();
    let root =
        workspace.import_root(&mut store, "/Model/books/Books.xsd", "upstream/books/Books.xsd", BOOKS)?;

    let mut resolver = workspace.resolver(store, ResolverConfig::default())?;
    resolver.process("/Model/books/Books.xsd", root)?;

    let records = resolver.records(root)?;
    assert_eq!(records.len(), 2);
    assert!(records[0].exists(resolver.store()));
    assert_eq!(records[1].resolved_path.as_deref(), Some("/Model/books/types/BookTypes.xsd"));
    assert!(!records[1].exists(resolver.store()));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_file_url_origin() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write("upstream/MovieDatatypes.xsd", "element Title\n")?;

    let mut store = MemoryModelStore::new();
    let origin = workspace.file_url("upstream/Movies.xsd");
    let root =
        workspace.import_root(&mut store, "/Movies.xsd", &origin, "import MovieDatatypes.xsd\n")?;

    let mut resolver = workspace.resolver(store, ResolverConfig::default())?;
    resolver.process("/Movies.xsd", root)?;

    let store = resolver.store();
    let generated = store.find("/MovieDatatypes.xsd").unwrap();
    assert_eq!(
        store.get_node(generated)?.text_property(EXTERNAL_ORIGIN_PROPERTY),
        Some(workspace.file_url("upstream/MovieDatatypes.xsd").as_str())
    );
    assert!(workspace.path().join("MovieDatatypes.xsd").is_file());
    Ok(())
}

#[test]
fn test_absolute_workspace_reference() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write("upstream/schemas/common/Common.xsd", "element Common\n")?;

    let mut store = MemoryModelStore::new();
    let root = workspace.import_root(
        &mut store,
        "/Model/books/Books.xsd",
        "/upstream/schemas/books/Books.xsd",
        "import /upstream/schemas/common/Common.xsd\n",
    )?;

    let mut resolver = workspace.resolver(store, ResolverConfig::default())?;
    resolver.process("/Model/books/Books.xsd", root)?;

    let records = resolver.records(root)?;
    assert_eq!(records[0].resolved_path.as_deref(), Some("/Model/common/Common.xsd"));
    assert!(records[0].exists(resolver.store()));
    assert!(workspace.path().join("Model/common/Common.xsd").is_file());
    Ok(())
}
