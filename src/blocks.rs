use std::ops::Deref;

use ratatui::text::{Span, Text};

use crate::error::Result;
use crate::markup;
use crate::style::TextStyles;
use crate::thread::DisplayState;
use crate::wrap::{indent, pad, wrap_spans};

/// Kind of a text block, used to pick its style.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextBlockKind {
    #[default]
    Text,
    Italic,
    Quote,
    Link,
    Raw,
    Author,
    Metadata,
}

/// A run of text sharing one kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBlock {
    pub kind: TextBlockKind,
    pub text: String,
}

impl TextBlock {
    pub fn new(kind: TextBlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Ordered sequence of [`TextBlock`]s making up a node's content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextBlocks(Vec<TextBlock>);

impl TextBlocks {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses markup; see [`markup::parse`].
    pub fn parse(markup: &str) -> Result<Self> {
        markup::parse(markup)
    }

    /// Parses markup, falling back to plain text for unsupported tags.
    pub fn parse_lossy(markup: &str) -> Self {
        markup::parse_lossy(markup)
    }

    pub fn push(&mut self, kind: TextBlockKind, text: impl Into<String>) {
        self.0.push(TextBlock::new(kind, text));
    }

    pub fn extend(&mut self, other: &Self) {
        self.0.extend_from_slice(&other.0);
    }

    /// Concatenated text of all blocks, without styling.
    pub fn plain_text(&self) -> String {
        self.0.iter().map(|block| block.text.as_str()).collect()
    }

    /// Renders the blocks for a node in the given display state.
    ///
    /// Blocks are styled per kind, word-wrapped to `state.text_width`, indented
    /// by `state.depth * state.indent` and padded to `state.width`.
    pub fn render(&self, state: &DisplayState, styles: &TextStyles) -> Text<'static> {
        if self.0.is_empty() {
            return Text::default();
        }
        let base = styles.base(state);
        let spans = self
            .0
            .iter()
            .map(|block| Span::styled(block.text.clone(), styles.block(block.kind, state)));
        let mut lines = wrap_spans(spans, state.text_width);
        indent(&mut lines, state.depth * state.indent, base);
        pad(&mut lines, state.width, base);
        Text::from(lines)
    }
}

impl Deref for TextBlocks {
    type Target = [TextBlock];

    fn deref(&self) -> &[TextBlock] {
        &self.0
    }
}

impl From<Vec<TextBlock>> for TextBlocks {
    fn from(blocks: Vec<TextBlock>) -> Self {
        Self(blocks)
    }
}

impl FromIterator<TextBlock> for TextBlocks {
    fn from_iter<I: IntoIterator<Item = TextBlock>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
