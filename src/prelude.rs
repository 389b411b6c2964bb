pub use crate::{
    BlockStyle, BoxedThread, Comment, DisplayState, Document, ScrollPolicy, TextBlock,
    TextBlockKind, TextBlocks, TextStyles, Thread, ThreadAction, ThreadCommand, ThreadEffect,
    ThreadEvent, ThreadMsg, ThreadPager, ThreadViewError, ThreadViewOptions, ThreadViewState,
    ThreadViewStyle,
};

#[cfg(feature = "keymap")]
pub use crate::{KeyCombo, KeymapProfile, ThreadKeyMap};

#[cfg(feature = "runtime")]
pub use crate::{Clipboard, EventLoop, Message};
