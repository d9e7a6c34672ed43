//! Static checks over a dialogue table.
//!
//! The table must be closed (every scripted action names a node), acyclic,
//! and every path from the entry must reach a reset option within
//! [`MAX_HOPS`] choices. Endings must carry a note for the session log.

use std::collections::HashSet;
use std::fmt;

use super::node::NodeId;
use super::table::DialogueTable;
use crate::chat::OptionAction;

/// Upper bound on choices from the entry node to a reset, inclusive.
pub const MAX_HOPS: usize = 10;

/// A problem found in a dialogue table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIssue {
    /// The declared entry node does not exist.
    MissingEntry { entry: NodeId },
    /// An option points at an id that is not in the table.
    Dangling { from: NodeId, action: String },
    /// An option leaves the scripted flow (no action, or a non-scripted id).
    NonScripted {
        from: NodeId,
        action: Option<String>,
    },
    /// A node offers no options, so the conversation cannot continue.
    DeadEnd { node: NodeId },
    /// Following options leads back to a node already on the path.
    Cycle { path: Vec<NodeId> },
    /// A path needs more than [`MAX_HOPS`] choices to reach a reset.
    TooDeep { path: Vec<NodeId> },
    /// A reset option without a note.
    EndingWithoutNote { node: NodeId },
    /// The node cannot be reached from the entry.
    Unreachable { node: NodeId },
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntry { entry } => write!(f, "entry node '{entry}' is missing"),
            Self::Dangling { from, action } => {
                write!(f, "'{from}' points at unknown node '{action}'")
            }
            Self::NonScripted { from, action } => match action {
                Some(action) => write!(f, "'{from}' leaves the scripted flow via '{action}'"),
                None => write!(f, "'{from}' has an option without an action"),
            },
            Self::DeadEnd { node } => write!(f, "'{node}' offers no options"),
            Self::Cycle { path } => write!(f, "cycle: {}", join(path)),
            Self::TooDeep { path } => {
                write!(f, "path longer than {MAX_HOPS} hops: {}", join(path))
            }
            Self::EndingWithoutNote { node } => write!(f, "ending '{node}' has no note"),
            Self::Unreachable { node } => write!(f, "'{node}' is unreachable"),
        }
    }
}

fn join(path: &[NodeId]) -> String {
    path.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Runs every check. An empty result means the table is valid.
pub fn check_table(table: &DialogueTable) -> Vec<TableIssue> {
    let mut walker = Walker::new(table);
    walker.run();

    let mut issues = walker.issues;
    for node in table.iter() {
        if !walker.visited.contains(&node.id) {
            issues.push(TableIssue::Unreachable {
                node: node.id.clone(),
            });
        }
    }
    issues
}

/// Every path from the entry to a node whose chosen option resets.
///
/// Walking stops at the first problem on a path, so on an invalid table the
/// result only covers the well-formed prefix of the graph.
pub fn walk_paths(table: &DialogueTable) -> Vec<Vec<NodeId>> {
    let mut walker = Walker::new(table);
    walker.run();
    walker.endings
}

struct Walker<'a> {
    table: &'a DialogueTable,
    path: Vec<NodeId>,
    visited: HashSet<NodeId>,
    issues: Vec<TableIssue>,
    endings: Vec<Vec<NodeId>>,
}

impl<'a> Walker<'a> {
    fn new(table: &'a DialogueTable) -> Self {
        Self {
            table,
            path: Vec::new(),
            visited: HashSet::new(),
            issues: Vec::new(),
            endings: Vec::new(),
        }
    }

    fn run(&mut self) {
        let entry = self.table.entry().clone();
        if !self.table.contains(entry.as_str()) {
            self.report(TableIssue::MissingEntry { entry });
            return;
        }
        self.visit(&entry);
    }

    fn report(&mut self, issue: TableIssue) {
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }

    fn visit(&mut self, id: &NodeId) {
        let table = self.table;
        let Some(node) = table.get(id.as_str()) else {
            return;
        };

        self.path.push(id.clone());
        self.visited.insert(id.clone());

        if self.path.len() > MAX_HOPS {
            self.report(TableIssue::TooDeep {
                path: self.path.clone(),
            });
            self.path.pop();
            return;
        }

        if node.next_options.is_empty() {
            self.report(TableIssue::DeadEnd { node: id.clone() });
        }

        for option in &node.next_options {
            match option.parsed_action() {
                OptionAction::Reset => {
                    if option.note.is_none() {
                        self.report(TableIssue::EndingWithoutNote { node: id.clone() });
                    }
                    self.endings.push(self.path.clone());
                }
                OptionAction::Scripted(next) => {
                    if !self.table.contains(next.as_str()) {
                        self.report(TableIssue::Dangling {
                            from: id.clone(),
                            action: next.to_string(),
                        });
                    } else if self.path.contains(&next) {
                        let mut cycle = self.path.clone();
                        cycle.push(next);
                        self.report(TableIssue::Cycle { path: cycle });
                    } else {
                        self.visit(&next);
                    }
                }
                OptionAction::Freeform | OptionAction::Menu(_) => {
                    self.report(TableIssue::NonScripted {
                        from: id.clone(),
                        action: option.action.clone(),
                    });
                }
            }
        }

        self.path.pop();
    }
}
