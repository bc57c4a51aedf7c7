use thiserror::Error;

/// The query cannot be turned into a rooted spanning tree.
///
/// This is the only hard failure of a matching run; every later stage
/// reports an empty result instead of an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecompositionError {
    #[error("query graph has no edges")]
    EmptyQuery,

    #[error("no query label has both a nonzero degree and data candidates")]
    NoViableRoot,

    #[error("query is disconnected: {} unreachable from root `{root}`", unreachable.join(", "))]
    Disconnected {
        root: String,
        unreachable: Vec<String>,
    },
}

impl DecompositionError {
    pub fn disconnected(root: impl Into<String>, mut unreachable: Vec<String>) -> Self {
        unreachable.sort();
        Self::Disconnected {
            root: root.into(),
            unreachable,
        }
    }
}
