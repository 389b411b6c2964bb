use ratatui::style::{Color, Modifier, Style};

use crate::blocks::TextBlockKind;
use crate::thread::DisplayState;

/// Scroll policy applied when the selection changes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollPolicy {
    /// The viewport only moves on explicit reset or paging.
    #[default]
    Manual,
    /// Every selection change snaps the viewport to the selected node.
    SnapToSelection,
}

/// A style with an optional override used while the node is selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockStyle {
    pub normal: Style,
    pub selected: Option<Style>,
}

impl BlockStyle {
    pub const fn new(normal: Style) -> Self {
        Self {
            normal,
            selected: None,
        }
    }

    pub const fn with_selected(mut self, selected: Style) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn get(&self, selected: bool) -> Style {
        match self.selected {
            Some(style) if selected => style,
            _ => self.normal,
        }
    }
}

/// Styles for each [`TextBlockKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyles {
    pub text: BlockStyle,
    pub italic: BlockStyle,
    pub quote: BlockStyle,
    pub link: BlockStyle,
    pub raw: BlockStyle,
    pub author: BlockStyle,
    pub metadata: BlockStyle,
    /// Base style of every cell of a selected node (indent and padding included).
    pub selected: Style,
    /// Base style of nodes below the selected one.
    pub subthread: Style,
}

impl Default for TextStyles {
    fn default() -> Self {
        Self {
            text: BlockStyle::new(Style::new().fg(Color::White)),
            italic: BlockStyle::new(Style::new().add_modifier(Modifier::ITALIC)),
            quote: BlockStyle::new(Style::new().add_modifier(Modifier::DIM)),
            link: BlockStyle::new(Style::new().fg(Color::Red)),
            raw: BlockStyle::new(Style::new().fg(Color::White)),
            author: BlockStyle::new(
                Style::new()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD),
            ),
            metadata: BlockStyle::new(Style::new().add_modifier(Modifier::DIM))
                .with_selected(Style::new().fg(Color::White)),
            selected: Style::new().bg(Color::Blue),
            subthread: Style::new(),
        }
    }
}

impl TextStyles {
    /// Style shared by every cell of a node in the given state.
    pub fn base(&self, state: &DisplayState) -> Style {
        if state.selected {
            self.selected
        } else if state.subthread {
            self.subthread
        } else {
            Style::new()
        }
    }

    /// Style of a block of the given kind, layered over the base style.
    pub fn block(&self, kind: TextBlockKind, state: &DisplayState) -> Style {
        let style = match kind {
            TextBlockKind::Text => self.text,
            TextBlockKind::Italic => self.italic,
            TextBlockKind::Quote => self.quote,
            TextBlockKind::Link => self.link,
            TextBlockKind::Raw => self.raw,
            TextBlockKind::Author => self.author,
            TextBlockKind::Metadata => self.metadata,
        };
        self.base(state).patch(style.get(state.selected))
    }
}

/// Visual settings of the pager widget.
#[derive(Clone, Copy, Debug)]
pub struct ThreadViewStyle {
    /// Style of the status row.
    pub status_style: Style,
    /// Style of the transient status message.
    pub message_style: Style,
    /// Draw a scrollbar when content overflows the viewport.
    pub scrollbar: bool,
}

impl Default for ThreadViewStyle {
    fn default() -> Self {
        Self {
            status_style: Style::new().bg(Color::Black),
            message_style: Style::new().bg(Color::Black).add_modifier(Modifier::BOLD),
            scrollbar: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_override_applies_only_when_selected() {
        let styles = TextStyles::default();
        let normal = DisplayState::default();
        let selected = DisplayState {
            selected: true,
            ..DisplayState::default()
        };

        assert_eq!(
            styles.block(TextBlockKind::Metadata, &normal),
            Style::new().add_modifier(Modifier::DIM)
        );
        assert_eq!(
            styles.block(TextBlockKind::Metadata, &selected),
            Style::new().bg(Color::Blue).fg(Color::White)
        );
    }
}
