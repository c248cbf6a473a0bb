use anyhow::Result;

use artifact_deps::config::ResolverConfig;
use artifact_deps::model::{MemoryModelStore, ModelStore};
use artifact_deps::resolver::dependency_records;

use crate::common::TestWorkspace;

#[test]
fn test_snapshot_round_trip_keeps_records() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write("upstream/MovieDatatypes.xsd", "element Title\n")?;
    let snapshot = workspace.path().join(".model/snapshot.json");

    let mut store = MemoryModelStore::new().with_snapshot(&snapshot);
    let root = workspace.import_root(
        &mut store,
        "/Movies.xsd",
        "upstream/Movies.xsd",
        "import MovieDatatypes.xsd\nimport ../Outside.xsd\n",
    )?;

    let mut resolver = workspace.resolver(store, ResolverConfig::default())?;
    resolver.process("/Movies.xsd", root)?;
    let before = resolver.records(root)?;
    assert!(snapshot.is_file());

    let restored = MemoryModelStore::load_snapshot(&snapshot)?;
    let restored_root = restored.find("/Movies.xsd").unwrap();
    let after = dependency_records(&restored, restored_root)?;

    assert_eq!(after, before);
    assert!(after[0].exists(&restored));
    assert_eq!(after[1].source_reference(), Some("../Outside.xsd"));
    assert_eq!(after[1].resolved_path, None);
    Ok(())
}

#[test]
fn test_reprocessing_restored_store_rebuilds_container() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let snapshot = workspace.path().join("snapshot.json");

    let mut store = MemoryModelStore::new().with_snapshot(&snapshot);
    let root = workspace.import_root(
        &mut store,
        "/Model/Books.xsd",
        "upstream/Books.xsd",
        "include Types.xsd\nredefine Base.xsd\n",
    )?;
    let mut resolver = workspace.resolver(store, ResolverConfig::default())?;
    resolver.process("/Model/Books.xsd", root)?;

    let restored = MemoryModelStore::load_snapshot(&snapshot)?;
    let restored_root = restored.find("/Model/Books.xsd").unwrap();
    let mut resolver = workspace.resolver(restored, ResolverConfig::default())?;
    resolver.process("/Model/Books.xsd", restored_root)?;

    let records = resolver.records(restored_root)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].path, "/Model/Books.xsd/dependencies/dependency1");
    assert_eq!(records[1].path, "/Model/Books.xsd/dependencies/dependency2");
    Ok(())
}
