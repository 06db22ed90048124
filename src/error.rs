//! What a learner command can end in.
//!
//! Nothing here is fatal. Every variant renders to the text shown in place
//! of the command's output, and the session carries on.

use std::fmt::Display;

use crate::graph::GraphError;
use crate::refs::RefError;
use crate::storage::StorageError;
use crate::vfs::FsError;

/// How much of a low-level error message survives into the output.
const ENGINE_MESSAGE_TAIL: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Bad or incomplete syntax. The message carries usage and any suggestion.
    #[error("{0}")]
    Parse(String),

    /// Not available in the active activity.
    #[error("{0}")]
    Gate(String),

    #[error("HEAD reference not found.\nThere is no repository here yet.\n\nTip:\n    git init")]
    RepoNotInitialized,

    #[error("error: {0}")]
    RefConflict(String),

    #[error("error: {0}")]
    Engine(String),

    #[error("{}", conflict_guidance(.ours, .theirs, .paths))]
    MergeConflict {
        ours: String,
        theirs: String,
        paths: Vec<String>,
    },

    #[error(
        "This kind of merge is not supported by the simulator ({0}).\n\
         Try a simpler scenario, e.g. branches that diverge less."
    )]
    MergeUnsupported(String),

    #[error("No simulated remote yet.\nCreate one first with: github create <repo-name>")]
    RemoteNotFound,

    /// The simulated remote refused the request.
    #[error("{0}")]
    Remote(String),

    /// A shell utility failed (`cat` on a missing file and the like).
    #[error("{0}")]
    Shell(String),
}

pub type Result<T> = core::result::Result<T, CommandError>;

impl CommandError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Wraps a low-level failure, keeping only the end of its message.
    pub fn engine(err: impl Display) -> Self {
        Self::Engine(tail(&err.to_string(), ENGINE_MESSAGE_TAIL))
    }
}

/// The last `max` characters of `message`.
pub fn tail(message: &str, max: usize) -> String {
    let count = message.chars().count();
    if count <= max {
        return message.to_string();
    }
    message.chars().skip(count - max).collect()
}

fn conflict_guidance(ours: &str, theirs: &str, paths: &[String]) -> String {
    let mut lines = vec![format!(
        "Merge conflict between {ours} and {theirs}."
    )];
    if !paths.is_empty() {
        lines.push("Conflicted files:".to_string());
        lines.extend(paths.iter().map(|p| format!("  - {p}")));
    }
    lines.extend(
        [
            "",
            "The conflicting parts are marked with:",
            "  <<<<<<< HEAD",
            "  =======",
            "  >>>>>>> branch",
            "",
            "Typical steps to resolve it:",
            "  1. Open each file and keep only the correct version.",
            "  2. Remove the conflict markers and save.",
            "  3. Run: git add <file>",
            "  4. Then: git commit -m \"Resolve merge conflict\"",
        ]
        .map(str::to_string),
    );
    lines.join("\n")
}

impl From<GraphError> for CommandError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotARepository(_) => Self::RepoNotInitialized,
            GraphError::MergeConflict { paths } => Self::MergeConflict {
                ours: "HEAD".to_string(),
                theirs: "the other branch".to_string(),
                paths,
            },
            GraphError::MergeUnsupported(reason) => Self::MergeUnsupported(reason),
            other => Self::engine(other),
        }
    }
}

impl From<RefError> for CommandError {
    fn from(err: RefError) -> Self {
        match err {
            RefError::Conflict(_) => Self::RefConflict(err.to_string()),
            RefError::Graph(inner) => inner.into(),
            other => Self::engine(other),
        }
    }
}

impl From<FsError> for CommandError {
    fn from(err: FsError) -> Self {
        Self::engine(err)
    }
}

impl From<StorageError> for CommandError {
    fn from(err: StorageError) -> Self {
        Self::engine(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_messages_keep_their_tail() {
        let long = format!("{}END", "x".repeat(500));
        let CommandError::Engine(message) = CommandError::engine(&long) else {
            panic!("expected an engine error");
        };
        assert_eq!(message.chars().count(), ENGINE_MESSAGE_TAIL);
        assert!(message.ends_with("END"));
    }

    #[test]
    fn tail_is_char_safe() {
        assert_eq!(tail("ñandú", 3), "ndú");
        assert_eq!(tail("short", 300), "short");
    }

    #[test]
    fn conflict_renders_numbered_steps() {
        let err = CommandError::MergeConflict {
            ours: "main".into(),
            theirs: "feature".into(),
            paths: vec!["index.html".into()],
        };
        let text = err.to_string();
        assert!(text.starts_with("Merge conflict between main and feature."));
        assert!(text.contains("  - index.html"));
        assert!(text.contains("  3. Run: git add <file>"));
    }

    #[test]
    fn graph_errors_map_onto_the_taxonomy() {
        assert_eq!(
            CommandError::from(GraphError::NotARepository("/repo".into())),
            CommandError::RepoNotInitialized
        );
        assert!(matches!(
            CommandError::from(GraphError::MergeUnsupported("x".into())),
            CommandError::MergeUnsupported(_)
        ));
        assert!(matches!(
            CommandError::from(RefError::Conflict("rescue".into())),
            CommandError::RefConflict(_)
        ));
    }
}
