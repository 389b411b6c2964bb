//! Ready-made nodes for discussion threads: a [`Document`] head and
//! [`Comment`]s with an author header and a markup body.

use std::fmt::Display;
use std::hash::Hash;

use ratatui::text::Text;

use crate::blocks::{TextBlockKind, TextBlocks};
use crate::style::TextStyles;
use crate::thread::{BoxedThread, DisplayState, Thread, ThreadEffect, ThreadMsg};
use crate::traversal::num_nodes;

/// One comment: a header line (author, age, fold marker) followed by its body.
pub struct Comment<Id> {
    id: Id,
    parent: Option<Id>,
    author: String,
    age: String,
    body: TextBlocks,
    replies: Vec<BoxedThread<Id>>,
    styles: TextStyles,
    state: DisplayState,
}

impl<Id: Copy + Eq + Hash + Display + 'static> Comment<Id> {
    /// Creates a comment; `markup` is parsed leniently, so unsupported tags
    /// show up as plain text.
    pub fn new(id: Id, author: impl Into<String>, markup: &str) -> Self {
        Self::with_body(id, author, TextBlocks::parse_lossy(markup))
    }

    pub fn with_body(id: Id, author: impl Into<String>, body: TextBlocks) -> Self {
        Self {
            id,
            parent: None,
            author: author.into(),
            age: String::new(),
            body,
            replies: Vec::new(),
            styles: TextStyles::default(),
            state: DisplayState::default(),
        }
    }

    /// Sets the relative age shown in the header, e.g. `"3 hours ago"`.
    #[must_use]
    pub fn age(mut self, age: impl Into<String>) -> Self {
        self.age = age.into();
        self
    }

    #[must_use]
    pub const fn styles(mut self, styles: TextStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Appends a reply and points its parent link at this comment.
    pub fn push_reply(&mut self, mut reply: Self) {
        reply.parent = Some(self.id);
        self.replies.push(Box::new(reply));
    }

    #[must_use]
    pub fn reply(mut self, reply: Self) -> Self {
        self.push_reply(reply);
        self
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub const fn body(&self) -> &TextBlocks {
        &self.body
    }

    fn header(&self) -> TextBlocks {
        let marker = if self.state.collapsed {
            format!("[{} more]", num_nodes(self))
        } else {
            "[-]".to_owned()
        };
        let mut blocks = TextBlocks::new();
        blocks.push(TextBlockKind::Author, self.author.clone());
        blocks.push(TextBlockKind::Text, " ");
        blocks.push(TextBlockKind::Metadata, format!("({})", self.age));
        blocks.push(TextBlockKind::Text, " ");
        blocks.push(TextBlockKind::Metadata, marker);
        blocks
    }
}

impl<Id: Copy + Eq + Hash + Display + 'static> Thread for Comment<Id> {
    type Id = Id;

    fn id(&self) -> Id {
        self.id
    }

    fn parent(&self) -> Option<Id> {
        self.parent
    }

    fn children(&self) -> &[BoxedThread<Id>] {
        &self.replies
    }

    fn children_mut(&mut self) -> &mut [BoxedThread<Id>] {
        &mut self.replies
    }

    fn update(&mut self, msg: &ThreadMsg) -> Option<ThreadEffect> {
        match msg {
            ThreadMsg::Display(state) => {
                self.state = *state;
                // Direct replies to the document are drawn flush left.
                self.state.depth = state.depth.saturating_sub(1);
                None
            }
            ThreadMsg::Copy => Some(ThreadEffect::CopyText(
                self.body.plain_text().trim().to_owned(),
            )),
        }
    }

    fn view(&self) -> Text<'static> {
        let mut blocks = self.header();
        if !self.state.collapsed {
            blocks.push(TextBlockKind::Text, "\n");
            blocks.extend(&self.body);
        }
        blocks.render(&self.state, &self.styles)
    }
}

/// Head of a discussion. Renders nothing; its comments are the top-level threads.
pub struct Document<Id> {
    id: Id,
    title: String,
    comments: Vec<BoxedThread<Id>>,
}

impl<Id: Copy + Eq + Hash + Display + 'static> Document<Id> {
    pub fn new(id: Id, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            comments: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Appends a top-level comment and points its parent link at the document.
    pub fn push(&mut self, mut comment: Comment<Id>) {
        comment.parent = Some(self.id);
        self.comments.push(Box::new(comment));
    }
}

impl<Id: Copy + Eq + Hash + Display + 'static> Thread for Document<Id> {
    type Id = Id;

    fn id(&self) -> Id {
        self.id
    }

    fn parent(&self) -> Option<Id> {
        None
    }

    fn children(&self) -> &[BoxedThread<Id>] {
        &self.comments
    }

    fn children_mut(&mut self) -> &mut [BoxedThread<Id>] {
        &mut self.comments
    }

    fn update(&mut self, msg: &ThreadMsg) -> Option<ThreadEffect> {
        match msg {
            ThreadMsg::Copy if !self.title.is_empty() => {
                Some(ThreadEffect::CopyText(self.title.clone()))
            }
            _ => None,
        }
    }

    fn view(&self) -> Text<'static> {
        Text::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ThreadAction, ThreadCommand, ThreadEvent};
    use crate::options::ThreadViewOptions;
    use crate::state::ThreadViewState;

    fn display(depth: usize, collapsed: bool) -> ThreadMsg {
        ThreadMsg::Display(DisplayState {
            collapsed,
            depth,
            width: 30,
            text_width: 30,
            indent: 2,
            ..DisplayState::default()
        })
    }

    fn rows(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|line| line.to_string().trim_end().to_owned())
            .collect()
    }

    fn discussion() -> Comment<u32> {
        Comment::new(1, "alice", "<p>hello <i>there</i>")
            .age("2h")
            .reply(Comment::new(2, "bob", "<p>hi").reply(Comment::new(3, "carol", "yes")))
            .reply(Comment::new(4, "dave", "<p>no"))
    }

    #[test]
    fn expanded_comment_shows_header_and_body() {
        let mut comment = discussion();
        comment.update(&display(2, false));

        assert_eq!(rows(&comment.view()), vec!["  alice (2h) [-]", "", "  hello there"]);
    }

    #[test]
    fn collapsed_comment_counts_its_sub_thread() {
        let mut comment = discussion();
        comment.update(&display(1, true));

        assert_eq!(rows(&comment.view()), vec!["alice (2h) [4 more]"]);
    }

    #[test]
    fn replies_point_back_at_their_parent() {
        let comment = discussion();
        let reply = &comment.children()[0];
        assert_eq!(reply.parent(), Some(1));
        assert_eq!(reply.children()[0].parent(), Some(2));
    }

    #[test]
    fn copy_yields_plain_body() {
        let mut comment = discussion();
        assert_eq!(
            comment.update(&ThreadMsg::Copy),
            Some(ThreadEffect::CopyText("hello there".into()))
        );
    }

    #[test]
    fn document_drives_a_thread_view() {
        let mut doc = Document::new(0, "Show: threads");
        doc.push(discussion());
        doc.push(Comment::new(5, "erin", "<p>top level <b>bold</b>"));
        assert_eq!(doc.update(&ThreadMsg::Copy), Some(ThreadEffect::CopyText("Show: threads".into())));

        let mut state = ThreadViewState::builder()
            .head(doc)
            .options(ThreadViewOptions::new().head_selectable(false))
            .build()
            .unwrap();
        state.resize(40, 20);
        assert_eq!(state.current_id(), 1);

        let text = state.view();
        assert_eq!(state.meta().node(0).height(), 0);
        assert!(text.lines[0].to_string().starts_with("alice"));

        state.handle_action(ThreadAction::Bottom);
        assert_eq!(
            state.handle_action(ThreadAction::Copy),
            ThreadEvent::Command(ThreadCommand::Copy("top level bold".into()))
        );
    }
}
