//! The dialogue node table.
//!
//! Scripted dialogue is content, not control flow: nodes are authored in TOML
//! and looked up by id. The built-in dating story is embedded at compile time;
//! an edited or localized copy can be loaded from disk with
//! [`DialogueTable::from_path`].

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::node::{DialogueNode, NodeId};
use super::validate::{self, TableIssue};
use crate::error::{Result, SalvaError};

const DATING_SOURCE: &str = include_str!("dating.toml");

static DATING_TABLE: Lazy<Result<DialogueTable>> =
    Lazy::new(|| DialogueTable::from_toml_str(DATING_SOURCE));

/// On-disk layout of a table file.
#[derive(Debug, Deserialize)]
struct TableFile {
    entry: NodeId,
    #[serde(rename = "node")]
    nodes: Vec<DialogueNode>,
}

/// Nodes keyed by id, keeping authoring order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTable {
    entry: NodeId,
    nodes: Vec<DialogueNode>,
    index: HashMap<NodeId, usize>,
}

impl DialogueTable {
    /// Builds a table without validating it.
    ///
    /// Duplicate ids are rejected because the later node would silently
    /// shadow the earlier one.
    pub fn new(entry: NodeId, nodes: Vec<DialogueNode>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), position).is_some() {
                return Err(SalvaError::invalid_table(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
        }
        Ok(Self {
            entry,
            nodes,
            index,
        })
    }

    /// The built-in dating story.
    pub fn dating() -> Result<Self> {
        DATING_TABLE.clone()
    }

    /// Parses and validates a table from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: TableFile = toml::from_str(source)?;
        let table = Self::new(file.entry, file.nodes)?;
        table.ensure_valid()?;
        Ok(table)
    }

    /// Reads, parses and validates a table file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            SalvaError::io(format!(
                "Failed to read dialogue table at {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!("[DialogueTable] Loading table from {}", path.display());
        Self::from_toml_str(&source)
    }

    pub fn entry(&self) -> &NodeId {
        &self.entry
    }

    pub fn get(&self, id: &str) -> Option<&DialogueNode> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = &DialogueNode> {
        self.nodes.iter()
    }

    /// Notes of every terminal node, in authoring order.
    pub fn endings(&self) -> Vec<&str> {
        self.nodes.iter().filter_map(|n| n.ending_note()).collect()
    }

    /// Runs every static check and returns the problems found.
    pub fn validate(&self) -> Vec<TableIssue> {
        validate::check_table(self)
    }

    /// Every path from the entry node to a terminal node.
    pub fn paths(&self) -> Vec<Vec<NodeId>> {
        validate::walk_paths(self)
    }

    fn ensure_valid(&self) -> Result<()> {
        let issues = self.validate();
        if issues.is_empty() {
            return Ok(());
        }
        let summary = issues
            .iter()
            .map(|issue| issue.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(SalvaError::invalid_table(summary))
    }
}
