use std::fmt::Display;
use std::hash::Hash;
use std::marker::PhantomData;

use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget};

use crate::state::ThreadViewState;
use crate::style::ThreadViewStyle;

/// Pager widget: the visible window of the thread, a scrollbar and a status row.
///
/// Rendering drives [`ThreadViewState::view`], so node heights and the content
/// height are refreshed on every frame.
pub struct ThreadPager<Id> {
    style: ThreadViewStyle,
    _id: PhantomData<fn() -> Id>,
}

impl<Id> Default for ThreadPager<Id> {
    fn default() -> Self {
        Self::new(ThreadViewStyle::default())
    }
}

impl<Id> ThreadPager<Id> {
    pub const fn new(style: ThreadViewStyle) -> Self {
        Self {
            style,
            _id: PhantomData,
        }
    }

    #[inline]
    fn render_scrollbar(area: Rect, buf: &mut Buffer, offset: usize, height: usize, rows: usize) {
        let scroll_rows = rows.saturating_sub(height);
        let scroll_len = scroll_rows.saturating_add(1);
        let mut scrollbar_state = ScrollbarState::new(scroll_len)
            .position(offset.min(scroll_rows))
            .viewport_content_length(height);
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .render(area, buf, &mut scrollbar_state);
    }
}

impl<Id: Copy + Eq + Hash + Display> StatefulWidget for ThreadPager<Id> {
    type State = ThreadViewState<Id>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.is_empty() {
            return;
        }
        let content_width = if self.style.scrollbar {
            area.width.saturating_sub(1)
        } else {
            area.width
        };
        let viewport = state.viewport_mut();
        viewport.top = area.y;
        viewport.width = content_width;
        viewport.height = area.height.saturating_sub(1);

        let text = state.view();
        let viewport = *state.viewport();
        let height = viewport.height as usize;
        let rows = text.lines.len();

        for (row, line) in text.lines.iter().skip(viewport.offset()).take(height).enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + row as u16;
            buf.set_line(area.x, y, line, content_width);
        }

        if self.style.scrollbar && rows > height {
            let scrollbar_area = Rect {
                x: area.x + area.width - 1,
                y: area.y,
                width: 1,
                height: viewport.height,
            };
            Self::render_scrollbar(scrollbar_area, buf, viewport.offset(), height, rows);
        }

        let status_area = Rect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };
        let style = if state.status().is_some() {
            self.style.message_style
        } else {
            self.style.status_style
        };
        buf.set_style(status_area, style);
        buf.set_stringn(
            status_area.x,
            status_area.y,
            state.status_line(),
            status_area.width as usize,
            style,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ThreadAction;
    use crate::options::ThreadViewOptions;
    use crate::traversal::tests::{Node, sample};

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn renders_window_and_status() {
        let mut state = ThreadViewState::new(sample()).unwrap();
        let area = Rect::new(0, 0, 20, 6);
        let mut buffer = Buffer::empty(area);

        ThreadPager::default().render(area, &mut buffer, &mut state);

        assert!(row(&buffer, 0).starts_with("0:0"));
        assert!(row(&buffer, 2).starts_with("3:0"));
        assert!(row(&buffer, 5).starts_with("n:Next") || !cfg!(feature = "keymap"));
        assert_eq!(state.viewport().height, 5);
        assert_eq!(state.viewport().width, 19);
    }

    #[test]
    fn transient_status_replaces_hints() {
        let mut state = ThreadViewState::new(sample()).unwrap();
        state.copy_finished(Ok(()));
        let area = Rect::new(0, 0, 40, 4);
        let mut buffer = Buffer::empty(area);

        ThreadPager::default().render(area, &mut buffer, &mut state);

        assert!(row(&buffer, 3).starts_with("Contents copied to clipboard"));
    }

    #[test]
    fn render_smoke_with_scrollbar() {
        let tree = Node::branch(0, (1..=12).map(Node::leaf).collect());
        let mut state = ThreadViewState::builder()
            .head(tree)
            .options(ThreadViewOptions::new().head_selectable(false))
            .build()
            .unwrap();
        let area = Rect::new(0, 0, 20, 6);
        let mut buffer = Buffer::empty(area);

        ThreadPager::default().render(area, &mut buffer, &mut state);
        state.handle_action(ThreadAction::PageDown);
        ThreadPager::default().render(area, &mut buffer, &mut state);

        assert_eq!(state.viewport().offset(), 1);
        assert!(row(&buffer, 0).starts_with("1:0"));
    }
}
