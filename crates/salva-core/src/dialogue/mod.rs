//! Scripted dialogue module.
//!
//! - `node`: Table entries (`DialogueNode`, `NodeId`, `DialogueFlow`)
//! - `table`: The keyed node table and its loaders (`DialogueTable`)
//! - `validate`: Closure, termination and cycle checks (`TableIssue`)

mod node;
mod table;
pub mod validate;

pub use node::{DialogueFlow, DialogueNode, NodeId};
pub use table::DialogueTable;
pub use validate::{MAX_HOPS, TableIssue};
