use std::io;

/// Errors surfaced by the thread view.
///
/// Navigation commands never fail; errors only come from construction,
/// markup parsing, the clipboard worker and the terminal.
#[derive(Debug, thiserror::Error)]
pub enum ThreadViewError {
    /// The view was built without a head node (or with otherwise unusable input).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The markup contains a tag outside the supported subset.
    #[error("unsupported markup tag <{tag}>")]
    UnsupportedMarkup { tag: String },
    /// A node identity is not present in the metadata cache.
    #[error("node {0} not found in thread index")]
    NodeNotFound(String),
    /// The clipboard collaborator reported an error.
    #[error("clipboard failure: {0}")]
    ClipboardFailure(String),
    #[error(transparent)]
    Terminal(#[from] io::Error),
}

pub type Result<T, E = ThreadViewError> = std::result::Result<T, E>;
