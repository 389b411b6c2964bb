//! Word wrapping, indentation and padding of styled text.
//!
//! The steps must run in that order: indenting before wrapping would make the
//! wrapper miscount line widths.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use smallvec::SmallVec;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use unicode_width::UnicodeWidthStr;

/// A word made of one or more styled pieces, followed by optional whitespace.
#[derive(Debug, Default)]
struct Word {
    pieces: SmallVec<[Span<'static>; 2]>,
    whitespace: Option<Span<'static>>,
    width: usize,
    whitespace_width: usize,
}

impl Word {
    fn is_empty(&self) -> bool {
        self.pieces.is_empty() && self.whitespace.is_none()
    }
}

#[allow(clippy::cast_precision_loss)]
impl Fragment for Word {
    fn width(&self) -> f64 {
        self.width as f64
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace_width as f64
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Run {
    Word,
    Space,
    Newline,
}

const fn run_of(c: char) -> Run {
    match c {
        '\n' => Run::Newline,
        c if c.is_whitespace() => Run::Space,
        _ => Run::Word,
    }
}

/// Splits styled spans into hard lines of words.
fn split_words<I>(spans: I) -> Vec<Vec<Word>>
where
    I: IntoIterator<Item = Span<'static>>,
{
    let mut lines = Vec::new();
    let mut line: Vec<Word> = Vec::new();
    let mut word = Word::default();

    for span in spans {
        let style = span.style;
        let content = span.content.as_ref();
        let mut rest = content;
        while let Some(first) = rest.chars().next() {
            let kind = run_of(first);
            let len = if kind == Run::Newline {
                first.len_utf8()
            } else {
                rest.find(|c| run_of(c) != kind).unwrap_or(rest.len())
            };
            let (run, tail) = rest.split_at(len);
            rest = tail;
            match kind {
                Run::Newline => {
                    if !word.is_empty() {
                        line.push(std::mem::take(&mut word));
                    }
                    lines.push(std::mem::take(&mut line));
                }
                Run::Space => {
                    word.whitespace_width += run.width();
                    match &mut word.whitespace {
                        Some(ws) => ws.content.to_mut().push_str(run),
                        None => word.whitespace = Some(Span::styled(run.to_string(), style)),
                    }
                }
                Run::Word => {
                    if word.whitespace.is_some() {
                        line.push(std::mem::take(&mut word));
                    }
                    word.width += run.width();
                    word.pieces.push(Span::styled(run.to_string(), style));
                }
            }
        }
    }
    if !word.is_empty() {
        line.push(word);
    }
    lines.push(line);
    lines
}

/// Wraps styled spans to `width` columns. Newlines always break; a width of 0
/// disables wrapping. Words are never split and trailing whitespace at a break
/// is dropped.
pub fn wrap_spans<I>(spans: I, width: usize) -> Vec<Line<'static>>
where
    I: IntoIterator<Item = Span<'static>>,
{
    let mut out = Vec::new();
    #[allow(clippy::cast_precision_loss)]
    let widths = [if width == 0 { f64::INFINITY } else { width as f64 }];
    for words in split_words(spans) {
        if words.is_empty() {
            out.push(Line::default());
            continue;
        }
        for chunk in wrap_first_fit(&words, &widths) {
            let mut spans = Vec::with_capacity(chunk.len() * 2);
            let last = chunk.len().saturating_sub(1);
            for (idx, word) in chunk.iter().enumerate() {
                spans.extend(word.pieces.iter().cloned());
                if idx < last
                    && let Some(ws) = &word.whitespace
                {
                    spans.push(ws.clone());
                }
            }
            out.push(Line::from(spans));
        }
    }
    out
}

/// Prefixes every line with `cells` spaces in `style`.
pub fn indent(lines: &mut [Line<'static>], cells: usize, style: Style) {
    if cells == 0 {
        return;
    }
    let prefix = " ".repeat(cells);
    for line in lines {
        line.spans.insert(0, Span::styled(prefix.clone(), style));
    }
}

/// Pads every line with spaces in `style` up to `width` cells.
pub fn pad(lines: &mut [Line<'static>], width: usize, style: Style) {
    for line in lines {
        let current = line.width();
        if current < width {
            line.spans
                .push(Span::styled(" ".repeat(width - current), style));
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::{Color, Modifier};

    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_spans([Span::raw("the quick brown fox jumps")], 10);
        assert_eq!(plain(&lines), vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn newlines_force_breaks_and_keep_empty_lines() {
        let lines = wrap_spans([Span::raw("\nhello\n\nworld")], 20);
        assert_eq!(plain(&lines), vec!["", "hello", "", "world"]);
    }

    #[test]
    fn long_words_are_not_split() {
        let lines = wrap_spans([Span::raw("a verylongword b")], 4);
        assert_eq!(plain(&lines), vec!["a", "verylongword", "b"]);
    }

    #[test]
    fn styled_pieces_of_one_word_stay_together() {
        let italic = Style::new().add_modifier(Modifier::ITALIC);
        let lines = wrap_spans(
            [
                Span::raw("aa foo"),
                Span::styled("bar", italic),
                Span::raw(" z"),
            ],
            7,
        );
        assert_eq!(plain(&lines), vec!["aa", "foobar", "z"]);
        assert_eq!(lines[1].spans[1].style, italic);
    }

    #[test]
    fn leading_whitespace_is_kept() {
        let lines = wrap_spans([Span::raw("  fn x()")], 40);
        assert_eq!(plain(&lines), vec!["  fn x()"]);
    }

    #[test]
    fn zero_width_disables_wrapping() {
        let lines = wrap_spans([Span::raw("one two three")], 0);
        assert_eq!(plain(&lines), vec!["one two three"]);
    }

    #[test]
    fn indent_then_pad_fills_the_width() {
        let bg = Style::new().bg(Color::Blue);
        let mut lines = wrap_spans([Span::raw("ab cd")], 2);
        indent(&mut lines, 4, bg);
        pad(&mut lines, 8, bg);

        assert_eq!(plain(&lines), vec!["    ab  ", "    cd  "]);
        assert!(lines.iter().all(|line| line.width() == 8));
        assert_eq!(lines[0].spans[0].style, bg);
    }
}
