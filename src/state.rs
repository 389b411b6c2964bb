use std::fmt::Display;
use std::hash::Hash;
use std::time::Duration;

use ratatui::text::{Line, Text};
use smallvec::SmallVec;
use unicode_width::UnicodeWidthStr;

use crate::action::{ThreadAction, ThreadCommand, ThreadEvent};
use crate::error::{Result, ThreadViewError};
use crate::meta::MetaCache;
use crate::options::ThreadViewOptions;
use crate::style::ScrollPolicy;
use crate::thread::{BoxedThread, DisplayState, Thread, ThreadEffect, ThreadMsg};
use crate::traversal::walk_mut;
use crate::viewport::Viewport;

#[cfg(feature = "keymap")]
use crate::keymap::ThreadKeyMap;
#[cfg(feature = "keymap")]
use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

/// How long a transient status message stays on screen.
pub const STATUS_TIMEOUT: Duration = Duration::from_millis(1250);

#[cfg(feature = "keymap")]
const MOUSE_SCROLL_ROWS: usize = 3;

#[cfg(feature = "keymap")]
const HINT_ACTIONS: &[ThreadAction] = &[
    ThreadAction::Next,
    ThreadAction::Prev,
    ThreadAction::Down,
    ThreadAction::Up,
    ThreadAction::ToggleFold,
    ThreadAction::Quit,
];

/// Navigation engine over one tree of [`Thread`] nodes.
///
/// Owns the tree, the metadata cache built from it, the current selection and
/// the viewport. Commands never fail; errors only surface at construction and
/// on identity lookups.
pub struct ThreadViewState<Id> {
    head: BoxedThread<Id>,
    meta: MetaCache<Id>,
    // Cache index of the selected node; always visible.
    current: usize,
    options: ThreadViewOptions,
    viewport: Viewport,
    status: Option<String>,
    // Bumped on every new status so a late clear cannot erase a newer message.
    status_token: u64,
    #[cfg(feature = "keymap")]
    keymap: ThreadKeyMap,
}

/// Builder for [`ThreadViewState`].
pub struct ThreadViewStateBuilder<Id> {
    head: Option<BoxedThread<Id>>,
    options: ThreadViewOptions,
    #[cfg(feature = "keymap")]
    keymap: ThreadKeyMap,
}

impl<Id> Default for ThreadViewStateBuilder<Id> {
    fn default() -> Self {
        Self {
            head: None,
            options: ThreadViewOptions::new(),
            #[cfg(feature = "keymap")]
            keymap: ThreadKeyMap::new(),
        }
    }
}

impl<Id: Copy + Eq + Hash + Display> ThreadViewStateBuilder<Id> {
    /// Sets the topmost node of the tree.
    #[must_use]
    pub fn head<T>(self, head: T) -> Self
    where
        T: Thread<Id = Id> + 'static,
    {
        self.boxed_head(Box::new(head))
    }

    #[must_use]
    pub fn boxed_head(mut self, head: BoxedThread<Id>) -> Self {
        self.head = Some(head);
        self
    }

    #[must_use]
    pub fn options(mut self, options: ThreadViewOptions) -> Self {
        self.options = options;
        self
    }

    #[cfg(feature = "keymap")]
    #[must_use]
    pub fn keymap(mut self, keymap: ThreadKeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Builds the metadata cache and places the initial selection.
    ///
    /// Fails with [`ThreadViewError::InvalidArgument`] when no head was given and
    /// with [`ThreadViewError::NodeNotFound`] when a node's parent link points
    /// outside the tree.
    pub fn build(self) -> Result<ThreadViewState<Id>> {
        let head = self
            .head
            .ok_or(ThreadViewError::InvalidArgument("thread view requires a head node"))?;
        let meta = MetaCache::build(head.as_ref())?;
        let current = if self.options.head_selectable {
            0
        } else {
            meta.node(0).children.first().copied().unwrap_or(0)
        };
        tracing::debug!(nodes = meta.len(), current, "built thread view");
        Ok(ThreadViewState {
            head,
            meta,
            current,
            options: self.options,
            viewport: Viewport::default(),
            status: None,
            status_token: 0,
            #[cfg(feature = "keymap")]
            keymap: self.keymap,
        })
    }
}

impl<Id: Copy + Eq + Hash + Display> ThreadViewState<Id> {
    pub fn builder() -> ThreadViewStateBuilder<Id> {
        ThreadViewStateBuilder::default()
    }

    /// Builds a state over `head` with default options.
    pub fn new<T>(head: T) -> Result<Self>
    where
        T: Thread<Id = Id> + 'static,
    {
        Self::builder().head(head).build()
    }

    /// Returns the cache index of the node with the given identity.
    pub fn index_of(&self, id: Id) -> Result<usize> {
        self.meta.index_of(id)
    }

    /// Identity of the current selection.
    pub fn current_id(&self) -> Id {
        self.meta.node(self.current).id
    }

    /// Selects the node with the given identity, unfolding its ancestors if it
    /// was hidden.
    pub fn select(&mut self, id: Id) -> Result<()> {
        let idx = self.meta.index_of(id)?;
        if !self.meta.node(idx).visible {
            let mut ancestor = self.meta.node(idx).parent;
            while let Some(parent) = ancestor {
                self.meta.node_mut(parent).collapsed = false;
                ancestor = self.meta.node(parent).parent;
            }
            self.meta.refresh_visibility(0, self.options.hide_collapsed);
        }
        self.select_index(idx);
        Ok(())
    }

    /// Row of the first line of node `idx` in the rendered content.
    pub fn offset_for_node(&self, idx: usize) -> usize {
        self.meta.offset_of(idx)
    }

    /// Node whose rows contain content row `y`, or the current node when none does.
    pub fn node_at_y(&self, y: usize) -> usize {
        self.meta.index_at(y).unwrap_or_else(|| {
            tracing::debug!(y, "no node at content row; keeping selection");
            self.current
        })
    }

    /// Selects the node drawn at screen row `row`.
    pub fn select_at_row(&mut self, row: u16) -> ThreadEvent {
        match self.viewport.content_row(row) {
            Some(y) => {
                let idx = self.node_at_y(y);
                self.select_index(idx)
            }
            None => ThreadEvent::Unhandled,
        }
    }

    /// Applies a terminal resize; one row is reserved for the status line.
    pub const fn resize(&mut self, width: u16, height: u16) {
        self.viewport.width = width;
        self.viewport.height = height.saturating_sub(1);
        self.viewport.set_content_height(self.viewport.content_height());
    }

    /// Handles a thread action and returns the resulting event.
    pub fn handle_action(&mut self, action: ThreadAction) -> ThreadEvent {
        tracing::trace!(?action, current = self.current, "handling action");
        match action {
            ThreadAction::Up => match self.meta.node(self.current).parent {
                Some(0) if !self.options.head_selectable => ThreadEvent::Unhandled,
                Some(parent) => self.select_index(parent),
                None => ThreadEvent::Unhandled,
            },
            ThreadAction::Down => {
                let node = self.meta.node(self.current);
                match node.children.first() {
                    Some(&child) if !node.collapsed => self.select_index(child),
                    _ => ThreadEvent::Unhandled,
                }
            }
            ThreadAction::PageUp => {
                self.viewport.scroll_up(self.page_rows());
                ThreadEvent::Handled
            }
            ThreadAction::PageDown => {
                self.viewport.scroll_down(self.page_rows());
                ThreadEvent::Handled
            }
            ThreadAction::Top => match self.meta.node(0).children.first() {
                Some(&child) => self.select_index(child),
                None => ThreadEvent::Unhandled,
            },
            ThreadAction::Bottom => match self.meta.node(0).children.last() {
                Some(&child) => self.select_index(child),
                None => ThreadEvent::Unhandled,
            },
            ThreadAction::Next => self.select_sibling(1),
            ThreadAction::Prev => self.select_sibling(-1),
            ThreadAction::Root => {
                let mut idx = self.current;
                while let Some(parent) = self.meta.node(idx).parent.filter(|&p| p != 0) {
                    idx = parent;
                }
                if idx == 0 && !self.options.head_selectable {
                    return ThreadEvent::Unhandled;
                }
                self.select_index(idx)
            }
            ThreadAction::ToggleFold => {
                let node = self.meta.node_mut(self.current);
                node.collapsed = !node.collapsed;
                if self.options.hide_collapsed {
                    self.meta.refresh_visibility(self.current, true);
                }
                ThreadEvent::Handled
            }
            ThreadAction::ExpandAll => {
                for idx in 0..self.meta.len() {
                    self.meta.node_mut(idx).collapsed = false;
                }
                self.meta.refresh_visibility(0, self.options.hide_collapsed);
                ThreadEvent::Handled
            }
            ThreadAction::CollapseAll => {
                let top: SmallVec<[usize; 8]> = self.meta.node(0).children.clone();
                for idx in top {
                    self.meta.node_mut(idx).collapsed = true;
                }
                self.meta.refresh_visibility(0, self.options.hide_collapsed);
                self.reveal_selection();
                ThreadEvent::Handled
            }
            ThreadAction::ResetView => {
                self.seek_to_current();
                ThreadEvent::Handled
            }
            ThreadAction::Copy => self.copy_current(),
            ThreadAction::Quit => ThreadEvent::Command(ThreadCommand::Quit),
        }
    }

    /// Records the outcome of a clipboard write as a transient status.
    ///
    /// The returned command asks the caller to clear the status later.
    pub fn copy_finished(&mut self, result: std::result::Result<(), String>) -> ThreadEvent {
        let status = match result {
            Ok(()) => "Contents copied to clipboard".to_owned(),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard write failed");
                format!("Failed to copy to clipboard: {err}")
            }
        };
        self.status = Some(status);
        self.status_token = self.status_token.wrapping_add(1);
        ThreadEvent::Command(ThreadCommand::ClearStatusAfter {
            delay: STATUS_TIMEOUT,
            token: self.status_token,
        })
    }

    /// Clears the transient status if `token` still refers to it.
    pub fn clear_status(&mut self, token: u64) -> ThreadEvent {
        if token != self.status_token || self.status.is_none() {
            return ThreadEvent::Unhandled;
        }
        self.status = None;
        ThreadEvent::Handled
    }

    /// Renders every visible node and records its height.
    ///
    /// Each node gets a [`ThreadMsg::Display`] right before its view is read.
    /// Hidden nodes get height 0 and produce no output.
    pub fn view(&mut self) -> Text<'static> {
        let width = self.viewport.width as usize;
        let text_width = self.options.text_width(width);
        let indent = self.options.indent;
        let current = self.current;
        let meta = &mut self.meta;
        let mut lines: Vec<Line<'static>> = Vec::new();

        walk_mut(self.head.as_mut(), None, |visit, node| {
            let idx = visit.index;
            let record = meta.node(idx);
            if !record.visible {
                meta.set_height(idx, 0);
                return;
            }
            let state = DisplayState {
                collapsed: record.collapsed,
                selected: idx == current,
                subthread: idx != current && meta.in_subthread(current, idx),
                depth: visit.depth,
                width,
                text_width,
                indent,
            };
            if let Some(effect) = node.update(&ThreadMsg::Display(state)) {
                tracing::warn!(idx, ?effect, "node returned an effect while rendering; ignored");
            }
            let text = node.view();
            meta.set_height(idx, text.lines.len());
            lines.extend(text.lines);
        });

        self.viewport.set_content_height(lines.len());
        Text::from(lines)
    }

    /// Text of the status row: the transient status if one is pending,
    /// otherwise key hints on the left and the position on the right.
    pub fn status_line(&self) -> String {
        if let Some(status) = &self.status {
            return status.clone();
        }
        let total = self.meta.len() - usize::from(!self.options.head_selectable);
        let position = self.current + usize::from(self.options.head_selectable);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (self.viewport.scroll_percent() * 100.0) as usize;
        let right = format!(
            "({} rows) #{} {position}/{total} {percent}%",
            self.meta.node(self.current).height,
            self.current_id(),
        );
        let left = self.hint();
        let padding = (self.viewport.width as usize).saturating_sub(left.width() + right.width());
        format!("{left}{}{right}", " ".repeat(padding))
    }

    #[cfg(feature = "keymap")]
    fn hint(&self) -> String {
        self.keymap.hint(HINT_ACTIONS)
    }

    #[cfg(not(feature = "keymap"))]
    fn hint(&self) -> String {
        String::new()
    }

    fn page_rows(&self) -> usize {
        (self.viewport.height as usize / 4).max(1)
    }

    fn seek_to_current(&mut self) {
        let offset = self.offset_for_node(self.current);
        self.viewport.set_offset(offset);
    }

    fn select_index(&mut self, idx: usize) -> ThreadEvent {
        if idx == self.current || !self.meta.get(idx).is_some_and(|node| node.visible) {
            return ThreadEvent::Unhandled;
        }
        self.current = idx;
        if self.options.scroll_policy == ScrollPolicy::SnapToSelection {
            self.seek_to_current();
        }
        ThreadEvent::Handled
    }

    fn select_sibling(&mut self, step: isize) -> ThreadEvent {
        let Some(parent) = self.meta.node(self.current).parent else {
            return ThreadEvent::Unhandled;
        };
        let siblings = &self.meta.node(parent).children;
        let Some(pos) = siblings.iter().position(|&idx| idx == self.current) else {
            tracing::error!(current = self.current, "selection missing from its parent's children");
            return ThreadEvent::Unhandled;
        };
        let target = pos.saturating_add_signed(step).min(siblings.len() - 1);
        let idx = siblings[target];
        self.select_index(idx)
    }

    // Moves the selection to its nearest visible ancestor.
    fn reveal_selection(&mut self) {
        let mut idx = self.current;
        while !self.meta.node(idx).visible {
            match self.meta.node(idx).parent {
                Some(parent) => idx = parent,
                None => break,
            }
        }
        self.select_index(idx);
    }

    fn copy_current(&mut self) -> ThreadEvent {
        let Some(node) = self.node_mut(self.current) else {
            return ThreadEvent::Unhandled;
        };
        match node.update(&ThreadMsg::Copy) {
            Some(ThreadEffect::CopyText(text)) => ThreadEvent::Command(ThreadCommand::Copy(text)),
            None => ThreadEvent::Unhandled,
        }
    }

    // Child positions leading from the head to `idx`.
    fn path_to(&self, idx: usize) -> SmallVec<[usize; 16]> {
        let mut path = SmallVec::new();
        let mut child = idx;
        while let Some(parent) = self.meta.node(child).parent {
            let pos = self
                .meta
                .node(parent)
                .children
                .iter()
                .position(|&c| c == child)
                .unwrap_or_default();
            path.push(pos);
            child = parent;
        }
        path.reverse();
        path
    }

    /// Returns the node at cache index `idx`.
    pub fn node(&self, idx: usize) -> Option<&dyn Thread<Id = Id>> {
        if idx >= self.meta.len() {
            return None;
        }
        let mut node: &dyn Thread<Id = Id> = self.head.as_ref();
        for pos in self.path_to(idx) {
            node = node.children().get(pos)?.as_ref();
        }
        Some(node)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut (dyn Thread<Id = Id> + 'static)> {
        if idx >= self.meta.len() {
            tracing::error!(idx, "node index out of range");
            return None;
        }
        let path = self.path_to(idx);
        let mut node: &mut (dyn Thread<Id = Id> + 'static) = self.head.as_mut();
        for pos in path {
            node = node.children_mut().get_mut(pos)?.as_mut();
        }
        Some(node)
    }
}

#[cfg(feature = "keymap")]
impl<Id: Copy + Eq + Hash + Display> ThreadViewState<Id> {
    /// Returns the key binding table.
    pub const fn keymap(&self) -> &ThreadKeyMap {
        &self.keymap
    }

    /// Returns a mutable reference to the key binding table.
    pub const fn keymap_mut(&mut self) -> &mut ThreadKeyMap {
        &mut self.keymap
    }

    /// Resolves a key event into an action and handles it.
    pub fn handle_key(&mut self, key: KeyEvent) -> ThreadEvent {
        self.handle_key_with(key, |_| None)
    }

    /// Resolves a key event with a custom mapping first and handles it.
    pub fn handle_key_with<F>(&mut self, key: KeyEvent, custom: F) -> ThreadEvent
    where
        F: Fn(&KeyEvent) -> Option<ThreadAction>,
    {
        if key.kind == KeyEventKind::Release {
            return ThreadEvent::Unhandled;
        }
        let Some(action) = self.keymap.resolve_with(&key, custom) else {
            return ThreadEvent::Unhandled;
        };
        self.handle_action(action)
    }

    /// Left click selects the node under the pointer; the wheel scrolls.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> ThreadEvent {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.select_at_row(mouse.row),
            MouseEventKind::ScrollUp => {
                self.viewport.scroll_up(MOUSE_SCROLL_ROWS);
                ThreadEvent::Handled
            }
            MouseEventKind::ScrollDown => {
                self.viewport.scroll_down(MOUSE_SCROLL_ROWS);
                ThreadEvent::Handled
            }
            _ => ThreadEvent::Unhandled,
        }
    }

    /// Dispatches any terminal event.
    pub fn handle_input(&mut self, event: Event) -> ThreadEvent {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.resize(width, height);
                ThreadEvent::Handled
            }
            _ => ThreadEvent::Unhandled,
        }
    }
}

impl<Id> ThreadViewState<Id> {
    /// Cache index of the current selection.
    pub const fn current(&self) -> usize {
        self.current
    }

    pub const fn meta(&self) -> &MetaCache<Id> {
        &self.meta
    }

    pub const fn options(&self) -> &ThreadViewOptions {
        &self.options
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Pending transient status, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The topmost node.
    pub fn head(&self) -> &dyn Thread<Id = Id> {
        self.head.as_ref()
    }
}
