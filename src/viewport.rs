/// Scrolling window over the rendered rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Screen row of the first viewport line.
    pub top: u16,
    pub width: u16,
    pub height: u16,
    offset: usize,
    content_height: usize,
}

impl Viewport {
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            top: 0,
            width,
            height,
            offset: 0,
            content_height: 0,
        }
    }

    /// Row of the content shown on the first viewport line.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn content_height(&self) -> usize {
        self.content_height
    }

    const fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.height as usize)
    }

    /// Records the content height of the latest render and re-clamps the offset.
    pub const fn set_content_height(&mut self, rows: usize) {
        self.content_height = rows;
        self.set_offset(self.offset);
    }

    pub const fn set_offset(&mut self, offset: usize) {
        let max = self.max_offset();
        self.offset = if offset > max { max } else { offset };
    }

    pub const fn scroll_up(&mut self, rows: usize) {
        self.set_offset(self.offset.saturating_sub(rows));
    }

    pub const fn scroll_down(&mut self, rows: usize) {
        self.set_offset(self.offset.saturating_add(rows));
    }

    /// Fraction of the content scrolled past, in `0.0..=1.0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn scroll_percent(&self) -> f64 {
        let height = self.height as usize;
        if height >= self.content_height {
            return 1.0;
        }
        (self.offset as f64 / (self.content_height - height) as f64).clamp(0.0, 1.0)
    }

    /// Index of the content row shown at screen row `row`, if the row is inside the viewport.
    pub const fn content_row(&self, row: u16) -> Option<usize> {
        if row < self.top || row >= self.top.saturating_add(self.height) {
            return None;
        }
        Some(self.offset + (row - self.top) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_clamped_to_content() {
        let mut viewport = Viewport::new(20, 5);
        viewport.set_content_height(12);
        viewport.scroll_down(100);
        assert_eq!(viewport.offset(), 7);
        viewport.scroll_up(3);
        assert_eq!(viewport.offset(), 4);

        viewport.set_content_height(6);
        assert_eq!(viewport.offset(), 1);
    }

    #[test]
    fn scroll_percent_matches_position() {
        let mut viewport = Viewport::new(20, 5);
        viewport.set_content_height(3);
        assert!((viewport.scroll_percent() - 1.0).abs() < f64::EPSILON);

        viewport.set_content_height(15);
        assert!(viewport.scroll_percent().abs() < f64::EPSILON);
        viewport.set_offset(5);
        assert!((viewport.scroll_percent() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn maps_screen_rows_to_content_rows() {
        let mut viewport = Viewport::new(20, 4);
        viewport.top = 2;
        viewport.set_content_height(10);
        viewport.set_offset(3);

        assert_eq!(viewport.content_row(1), None);
        assert_eq!(viewport.content_row(2), Some(3));
        assert_eq!(viewport.content_row(5), Some(6));
        assert_eq!(viewport.content_row(6), None);
    }
}
