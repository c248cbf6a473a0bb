use anyhow::Result;
use serial_test::serial;

use artifact_deps::config::{ContainerPolicy, ResolverConfig};
use artifact_deps::constants::{CONFIG_PATH_ENV, MAX_DEPTH_ENV};
use artifact_deps::model::{MemoryModelStore, ModelStore};

use crate::common::TestWorkspace;

const CONFIG: &str = r#"
max_depth = 1
container_name = "imports"
container_policy = "reuse"

[fetch]
timeout_secs = 5
max_retries = 0
"#;

#[test]
fn test_config_file_drives_resolver() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let config_path = workspace.write("config.toml", CONFIG)?;
    let config = ResolverConfig::load(&config_path)?;
    assert_eq!(config.container_policy, ContainerPolicy::Reuse);
    assert_eq!(config.fetch.timeout_secs, 5);

    workspace.write("upstream/A.xsd", "import B.xsd\n")?;
    workspace.write("upstream/B.xsd", "element B\n")?;

    let mut store = MemoryModelStore::new();
    let root = workspace.import_root(&mut store, "/Root.xsd", "upstream/Root.xsd", "import A.xsd\n")?;
    let mut resolver = workspace.resolver(store, config)?;

    let container = resolver.process("/Root.xsd", root)?;
    assert_eq!(container.as_deref(), Some("/Root.xsd/imports"));

    // Depth 1 materializes A but not A's own dependency.
    assert!(resolver.store().node_exists("/A.xsd"));
    assert!(!resolver.store().node_exists("/B.xsd"));
    assert!(resolver.store().node_exists("/A.xsd/imports/dependency1"));

    resolver.process("/Root.xsd", root)?;
    assert_eq!(resolver.records(root)?.len(), 1);
    Ok(())
}

#[test]
#[serial]
fn test_discover_from_environment() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let config_path = workspace.write("config.toml", CONFIG)?;

    let original_config = std::env::var(CONFIG_PATH_ENV).ok();
    let original_depth = std::env::var(MAX_DEPTH_ENV).ok();
    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, &config_path);
        std::env::set_var(MAX_DEPTH_ENV, "3");
    }

    let result = ResolverConfig::discover();

    unsafe {
        match original_config {
            Some(val) => std::env::set_var(CONFIG_PATH_ENV, val),
            None => std::env::remove_var(CONFIG_PATH_ENV),
        }
        match original_depth {
            Some(val) => std::env::set_var(MAX_DEPTH_ENV, val),
            None => std::env::remove_var(MAX_DEPTH_ENV),
        }
    }

    let config = result?;
    assert_eq!(config.container_name, "imports");
    assert_eq!(config.max_depth, 3);
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let config_path = workspace.write("config.toml", "container_policy = \"merge\"\n")?;
    assert!(ResolverConfig::load(&config_path).is_err());

    let config_path = workspace.write("config.toml", "container_name = \"\"\n")?;
    assert!(ResolverConfig::load(&config_path).is_err());
    Ok(())
}
