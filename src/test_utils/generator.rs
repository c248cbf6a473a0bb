//! A line-oriented model generator for tests.
//!
//! Artifacts are plain text, one directive per line:
//!
//! ```text
//! # comment
//! import ./data/types/BookDatatypes.xsd
//! include ../common/Common.xsd
//! element Book
//! ```
//!
//! Every artifact is generated below a `document` wrapper, like the trees of
//! real schema parsers.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;

use super::builder::ArtifactSpec;
use crate::generator::{Metamodel, ModelGenerator};
use crate::model::{ModelStore, NodeId, ReferenceKind};
use crate::utils::fs::{read_text_file, workspace_file_path};

const DIRECTIVE_PATTERN: &str = r"^\s*(import|include|redefine|element)\s+(\S+)\s*$";

/// Generates trees from directive files below a workspace root.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    root: PathBuf,
    failing: HashSet<String>,
    generated: Vec<(String, String)>,
}

impl ScriptedGenerator {
    /// A generator reading workspace files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            failing: HashSet::new(),
            generated: Vec::new(),
        }
    }

    /// Makes generation of `workspace_path` fail.
    pub fn fail_on(mut self, workspace_path: impl Into<String>) -> Self {
        self.failing.insert(workspace_path.into());
        self
    }

    /// `(workspace_path, model_path)` of every successful generation, in order.
    pub fn generated(&self) -> &[(String, String)] {
        &self.generated
    }

    /// Parses directive text into an artifact description.
    pub fn parse(model_path: &str, text: &str) -> Result<ArtifactSpec> {
        let pattern = Regex::new(DIRECTIVE_PATTERN)?;
        let mut spec = ArtifactSpec::new(model_path).wrapped();

        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let captures = pattern
                .captures(line)
                .with_context(|| format!("line {}: unknown directive '{}'", number + 1, trimmed))?;
            let argument = captures[2].to_string();
            spec = match ReferenceKind::from_directive(&captures[1]) {
                Some(kind) => spec.reference(kind, argument),
                None => spec.element(argument),
            };
        }
        Ok(spec)
    }
}

impl ModelGenerator for ScriptedGenerator {
    fn generate_model(
        &mut self,
        store: &mut dyn ModelStore,
        workspace_path: &str,
        model_path: &str,
        metamodel: &Metamodel,
    ) -> Result<NodeId> {
        if self.failing.contains(workspace_path) {
            anyhow::bail!("{} is not a valid {} artifact", workspace_path, metamodel.id);
        }

        let file = workspace_file_path(&self.root, workspace_path)
            .with_context(|| format!("{workspace_path} is outside the workspace"))?;
        let text = read_text_file(&file)?;
        let root = Self::parse(model_path, &text)?.build_in(store)?;

        self.generated.push((workspace_path.to_string(), model_path.to_string()));
        Ok(root)
    }
}
