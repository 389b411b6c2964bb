//! Collapsible thread view for ratatui: a navigation engine over trees of
//! nodes, a markup-to-styled-text pipeline and a pager widget.
//!
//! Feature flags:
//! - `keymap`: crossterm key/mouse handling and `ThreadViewState::handle_input`.
//! - `runtime`: event loop with a background clipboard worker (implies `keymap`).
//! - `serde`: serde support for `ThreadViewOptions`, `ThreadKeyMap` and `ThreadAction`.

mod action;
mod blocks;
mod comment;
mod error;
#[cfg(feature = "keymap")]
mod keymap;
pub mod markup;
mod meta;
mod options;
pub mod prelude;
#[cfg(feature = "runtime")]
mod runtime;
mod state;
mod style;
mod thread;
pub mod traversal;
mod viewport;
pub mod wrap;
mod widget;

pub use action::{ThreadAction, ThreadCommand, ThreadEvent};
pub use blocks::{TextBlock, TextBlockKind, TextBlocks};
pub use comment::{Comment, Document};
pub use error::{Result, ThreadViewError};
#[cfg(feature = "keymap")]
pub use keymap::{KeyBinding, KeyCombo, KeymapProfile, ThreadKeyMap};
pub use meta::{MetaCache, NodeMeta};
pub use options::ThreadViewOptions;
#[cfg(feature = "runtime")]
pub use runtime::{Clipboard, EventLoop, Message};
pub use state::{STATUS_TIMEOUT, ThreadViewState, ThreadViewStateBuilder};
pub use style::{BlockStyle, ScrollPolicy, TextStyles, ThreadViewStyle};
pub use thread::{BoxedThread, DisplayState, Thread, ThreadEffect, ThreadMsg};
pub use viewport::Viewport;
pub use widget::ThreadPager;
