use std::time::Duration;

/// Commands a user can issue to the thread view.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThreadAction {
    /// Move to the parent of the current node.
    Up,
    /// Move to the first child of the current node.
    Down,
    /// Scroll the viewport up by a quarter page.
    PageUp,
    /// Scroll the viewport down by a quarter page.
    PageDown,
    /// Select the first top-level thread.
    Top,
    /// Select the last top-level thread.
    Bottom,
    /// Select the next sibling.
    Next,
    /// Select the previous sibling.
    Prev,
    /// Jump to the top-level thread containing the current node.
    Root,
    /// Fold or unfold the current node.
    ToggleFold,
    /// Unfold every node.
    ExpandAll,
    /// Fold every top-level thread.
    CollapseAll,
    /// Scroll so the current node is at the top of the viewport.
    ResetView,
    /// Ask the current node to copy its text.
    Copy,
    Quit,
}

impl ThreadAction {
    /// Short label used in key hints.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::PageUp => "PgUp",
            Self::PageDown => "PgDn",
            Self::Top => "Top",
            Self::Bottom => "Bottom",
            Self::Next => "Next",
            Self::Prev => "Prev",
            Self::Root => "Root",
            Self::ToggleFold => "Fold",
            Self::ExpandAll => "Expand",
            Self::CollapseAll => "Collapse",
            Self::ResetView => "Reset",
            Self::Copy => "Copy",
            Self::Quit => "Quit",
        }
    }
}

/// Work the caller must carry out on behalf of the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThreadCommand {
    /// Stop the event loop.
    Quit,
    /// Write the text to the clipboard in the background and report back with
    /// [`ThreadViewState::copy_finished`](crate::ThreadViewState::copy_finished).
    Copy(String),
    /// Call [`ThreadViewState::clear_status`](crate::ThreadViewState::clear_status)
    /// with `token` once `delay` has elapsed.
    ClearStatusAfter { delay: Duration, token: u64 },
}

/// Result of handling an action or input event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThreadEvent {
    /// The event was handled internally and state was updated.
    Handled,
    /// The event was ignored.
    Unhandled,
    /// The event was handled and the caller must run the command.
    Command(ThreadCommand),
}
