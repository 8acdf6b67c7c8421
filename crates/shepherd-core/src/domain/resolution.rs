use std::fmt;

use super::NodeId;

/// Outcome of asking a resolver where a task should run.
///
/// `Unresolved` is not an error: it means "no decision this tick, try again".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Run the task on this node.
    Node(NodeId),
    /// No live candidate, or the resolver could not decide.
    Unresolved,
}

impl Resolution {
    /// The chosen node, if any.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Resolution::Node(id) => Some(id),
            Resolution::Unresolved => None,
        }
    }
}

impl From<Option<NodeId>> for Resolution {
    fn from(value: Option<NodeId>) -> Self {
        value.map_or(Resolution::Unresolved, Resolution::Node)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Node(id) => write!(f, "{id}"),
            Resolution::Unresolved => f.write_str("<unresolved>"),
        }
    }
}
