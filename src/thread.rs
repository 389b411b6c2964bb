use std::fmt::Display;
use std::hash::Hash;

use ratatui::text::Text;

/// Owned child node, erased to the capability.
pub type BoxedThread<Id> = Box<dyn Thread<Id = Id>>;

/// Minimal contract a node must satisfy to be shown by the thread view.
///
/// A proper tree is expected:
/// - children are owned by their parent and are the only ownership path;
/// - `parent` is a non-owning back link (the identity of the parent);
/// - identifiers are unique within one tree (collisions are the caller's problem).
///
/// The view never inspects the concrete node type. Shape must not change while
/// a [`ThreadViewState`](crate::ThreadViewState) owns the tree.
pub trait Thread {
    /// Node identifier type.
    type Id: Copy + Eq + Hash + Display;

    /// Returns the node identity.
    fn id(&self) -> Self::Id;
    /// Returns the parent identity, or `None` for the document root.
    fn parent(&self) -> Option<Self::Id>;
    /// Returns the node's children in display order.
    fn children(&self) -> &[BoxedThread<Self::Id>];
    /// Mutable access to the children, used to deliver messages during a render pass.
    fn children_mut(&mut self) -> &mut [BoxedThread<Self::Id>];
    /// Handles a control message and optionally requests a side effect.
    fn update(&mut self, msg: &ThreadMsg) -> Option<ThreadEffect>;
    /// Returns the node's current styled text. Called right after a [`ThreadMsg::Display`].
    fn view(&self) -> Text<'static>;
}

/// State pushed to a node before its view is read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// The node is folded.
    pub collapsed: bool,
    /// The node is the current selection.
    pub selected: bool,
    /// Some ancestor is the current selection.
    pub subthread: bool,
    /// Depth from the head (the head is 0).
    pub depth: usize,
    /// Viewport width in cells.
    pub width: usize,
    /// Width available for wrapped text.
    pub text_width: usize,
    /// Cells of indentation per depth level.
    pub indent: usize,
}

/// Messages the view sends to nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadMsg {
    Display(DisplayState),
    /// The user asked to copy this node's text.
    Copy,
}

/// Side effects a node may request from its update hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThreadEffect {
    /// Write the text to the clipboard.
    CopyText(String),
}
