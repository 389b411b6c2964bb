use crate::style::ScrollPolicy;

/// Behavior settings of a [`ThreadViewState`](crate::ThreadViewState).
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`;
/// missing fields take their default.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadViewOptions {
    /// Whether the head node can be selected. When it cannot, it acts as a
    /// virtual document root.
    pub head_selectable: bool,
    /// Hide every descendant of a folded node instead of only abbreviating it.
    pub hide_collapsed: bool,
    /// Upper bound on wrapped text width; 0 means the viewport width.
    pub max_width: usize,
    /// Cells of indentation per depth level.
    pub indent: usize,
    pub scroll_policy: ScrollPolicy,
}

impl ThreadViewOptions {
    pub const fn new() -> Self {
        Self {
            head_selectable: true,
            hide_collapsed: false,
            max_width: 72,
            indent: 2,
            scroll_policy: ScrollPolicy::Manual,
        }
    }

    pub const fn head_selectable(mut self, selectable: bool) -> Self {
        self.head_selectable = selectable;
        self
    }

    pub const fn hide_collapsed(mut self, hide: bool) -> Self {
        self.hide_collapsed = hide;
        self
    }

    pub const fn max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    pub const fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub const fn scroll_policy(mut self, policy: ScrollPolicy) -> Self {
        self.scroll_policy = policy;
        self
    }

    /// Width available to wrapped text in a viewport of `width` cells.
    pub fn text_width(&self, width: usize) -> usize {
        if self.max_width == 0 {
            width
        } else {
            self.max_width.min(width)
        }
    }
}

impl Default for ThreadViewOptions {
    fn default() -> Self {
        Self::new()
    }
}
