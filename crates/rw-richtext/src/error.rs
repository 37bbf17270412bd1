//! Error types for rendering.

use std::fmt;

use serde::Serialize;

use crate::node::NodeKind;

/// One step of a [`NodePath`]: node kind and its index among its siblings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathSegment {
    pub kind: NodeKind,
    pub index: usize,
}

/// Position of a node in the document tree, from the root down.
///
/// Displayed as `document/list[0]/item[2]/paragraph[0]`. The root segment
/// is printed without an index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NodePath(pub Vec<PathSegment>);

impl NodePath {
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((root, rest)) = self.0.split_first() else {
            return f.write_str("<root>");
        };
        write!(f, "{}", root.kind)?;
        for segment in rest {
            write!(f, "/{}[{}]", segment.kind, segment.index)?;
        }
        Ok(())
    }
}

/// Error that aborts a render.
///
/// Every variant aborts the whole traversal: the caller gets either a complete
/// tree or exactly one of these.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// No renderer is registered for a node kind.
    #[error("no renderer registered for node kind `{kind}` at {path}")]
    UnregisteredKind {
        /// The offending kind.
        kind: NodeKind,
        /// Where the node sits in the document.
        path: NodePath,
    },

    /// Unbalanced push/pop or a write without an open container.
    ///
    /// Always a renderer bug.
    #[error("render invariant violated: {message} (open containers: [{}])", .stack.join(", "))]
    InvariantViolation {
        /// What went wrong.
        message: String,
        /// Names of the open containers at the time of the violation, bottom first.
        stack: Vec<String>,
    },

    /// A node is missing a required attribute or has an unusable value.
    #[error("invalid `{kind}` node at {path}: {message}")]
    InvalidInput {
        /// Kind of the invalid node.
        kind: NodeKind,
        /// Where the node sits in the document.
        path: NodePath,
        /// What is wrong with it.
        message: String,
    },

    /// The document nests deeper than the configured limit.
    #[error("nesting depth limit of {limit} exceeded at {path}")]
    DepthLimitExceeded {
        /// Configured limit.
        limit: usize,
        /// Path of the first node beyond the limit.
        path: NodePath,
    },

    /// The cancellation flag was raised between two sibling renders.
    #[error("rendering cancelled at {path}")]
    Cancelled {
        /// Path of the next node that would have been rendered.
        path: NodePath,
    },
}

/// Recoverable problem reported alongside a successful render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderWarning {
    pub path: NodePath,
    pub message: String,
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> NodePath {
        NodePath(vec![
            PathSegment {
                kind: NodeKind::Document,
                index: 0,
            },
            PathSegment {
                kind: NodeKind::List,
                index: 0,
            },
            PathSegment {
                kind: NodeKind::ListItem,
                index: 2,
            },
        ])
    }

    #[test]
    fn test_path_display() {
        assert_eq!(path().to_string(), "document/list[0]/item[2]");
        assert_eq!(NodePath::default().to_string(), "<root>");
    }

    #[test]
    fn test_path_segments() {
        let path = path();
        assert_eq!(path.len(), 3);
        let last = &path.segments()[2];
        assert_eq!(last.kind, NodeKind::ListItem);
        assert_eq!(last.index, 2);
        assert!(NodePath::default().segments().is_empty());
    }

    #[test]
    fn test_unregistered_kind_message() {
        let err = RenderError::UnregisteredKind {
            kind: NodeKind::custom("embed"),
            path: path(),
        };
        assert_eq!(
            err.to_string(),
            "no renderer registered for node kind `embed` at document/list[0]/item[2]"
        );
    }

    #[test]
    fn test_invariant_violation_lists_stack() {
        let err = RenderError::InvariantViolation {
            message: "pop with empty stack".to_owned(),
            stack: vec!["document".to_owned(), "paragraph".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "render invariant violated: pop with empty stack (open containers: [document, paragraph])"
        );
    }
}
