use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_types::Digest;

/// One node in the staging hierarchy.
///
/// A path position is either a leaf (a staged file or a staged model
/// placeholder) or a directory of child nodes — never both. The tagged
/// variant makes that invariant structural instead of a runtime shape check
/// on a dynamic map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum IndexNode {
    /// A staged ordinary file: its content digest and repo-relative path.
    File { path: String, hash: Digest },
    /// A staged model file. The digest lives with its manifest in the
    /// parallel model map; this leaf just marks the position.
    Model { path: String },
    /// A directory of child nodes, keyed by path segment. `BTreeMap` keeps
    /// iteration in key order, which is what makes tree builds deterministic
    /// under any insertion order.
    Directory { children: BTreeMap<String, IndexNode> },
}

impl IndexNode {
    /// An empty directory node.
    pub fn empty_dir() -> Self {
        Self::Directory {
            children: BTreeMap::new(),
        }
    }

    /// Returns `true` if this node is a leaf (file or model).
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Directory { .. })
    }

    /// Short description for conflict error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::File { .. } => "a staged file",
            Self::Model { .. } => "a staged model",
            Self::Directory { .. } => "a directory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_and_directory_are_distinct() {
        let file = IndexNode::File {
            path: "a.txt".into(),
            hash: Digest::from_bytes(b"a"),
        };
        let dir = IndexNode::empty_dir();
        assert!(file.is_leaf());
        assert!(!dir.is_leaf());
        assert_eq!(file.describe(), "a staged file");
        assert_eq!(dir.describe(), "a directory");
    }

    #[test]
    fn serde_tags_variants() {
        let node = IndexNode::Model {
            path: "models/m.pt".into(),
        };
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"node\":\"model\""));
        let parsed: IndexNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, node);
    }
}
