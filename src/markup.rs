//! Parser for the small markup subset used in thread bodies.
//!
//! Supported: `<p>`, `<i>`, `<a ...>`, `<pre>`, `<code>`, end tags, comments,
//! and quote lines (text starting with `>`). Self-closing tags are ignored.
//! Entities are left untouched.

use crate::blocks::{TextBlock, TextBlockKind, TextBlocks};
use crate::error::{Result, ThreadViewError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Start(&'a str),
    End,
}

/// Parses markup, failing on the first tag outside the supported subset.
pub fn parse(markup: &str) -> Result<TextBlocks> {
    parse_with(markup, true)
}

/// Parses markup, rendering spans of unsupported tags as plain text.
pub fn parse_lossy(markup: &str) -> TextBlocks {
    parse_with(markup, false).unwrap_or_default()
}

fn parse_with(markup: &str, strict: bool) -> Result<TextBlocks> {
    let mut blocks = Vec::new();
    let mut kind = TextBlockKind::Text;
    for token in Tokens::new(markup) {
        match token {
            Token::Start(tag) => match tag.to_ascii_lowercase().as_str() {
                "p" => {
                    kind = TextBlockKind::Text;
                    blocks.push(TextBlock::new(TextBlockKind::Text, "\n"));
                }
                "i" => kind = TextBlockKind::Italic,
                "a" => kind = TextBlockKind::Link,
                "pre" => {
                    kind = TextBlockKind::Raw;
                    blocks.push(TextBlock::new(TextBlockKind::Text, "\n"));
                }
                "code" => {}
                other => {
                    if strict {
                        return Err(ThreadViewError::UnsupportedMarkup {
                            tag: other.to_string(),
                        });
                    }
                    tracing::warn!(tag = other, "unsupported markup tag, rendering as plain text");
                    kind = TextBlockKind::Text;
                }
            },
            Token::End => kind = TextBlockKind::Text,
            Token::Text(text) => {
                if text.starts_with('>') {
                    kind = TextBlockKind::Quote;
                }
                blocks.push(TextBlock::new(kind, text));
            }
        }
    }
    Ok(TextBlocks::from(blocks))
}

struct Tokens<'a> {
    src: &'a str,
    pos: usize,
    pending: Option<Token<'a>>,
}

impl<'a> Tokens<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            pending: None,
        }
    }

    // Returns the token for a tag starting at `at` and the position after it,
    // or `None` if the `<` there does not open a tag.
    fn tag_at(&self, at: usize) -> Option<(Option<Token<'a>>, usize)> {
        let rest = &self.src[at..];
        let bytes = rest.as_bytes();
        match bytes.get(1)? {
            b'!' => {
                let end = if rest.starts_with("<!--") {
                    rest[4..].find("-->").map_or(rest.len(), |i| i + 4 + 3)
                } else {
                    rest.find('>').map_or(rest.len(), |i| i + 1)
                };
                Some((None, at + end))
            }
            b'/' if bytes.get(2).is_some_and(u8::is_ascii_alphabetic) => {
                let end = tag_end(rest)?;
                Some((Some(Token::End), at + end))
            }
            b if b.is_ascii_alphabetic() => {
                let end = tag_end(rest)?;
                // Self-closing tags such as `<br/>` carry no text and are skipped.
                if rest[..end].ends_with("/>") {
                    return Some((None, at + end));
                }
                let name_len = rest[1..]
                    .find(|c: char| !c.is_ascii_alphanumeric())
                    .unwrap_or(rest.len() - 1);
                Some((Some(Token::Start(&rest[1..=name_len])), at + end))
            }
            _ => None,
        }
    }
}

// Position just past the closing `>` of a tag, honoring quoted attribute values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(idx + 1),
            _ => {}
        }
    }
    None
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        loop {
            if self.pos >= self.src.len() {
                return None;
            }
            let start = self.pos;
            let mut search = start;
            while let Some(offset) = self.src[search..].find('<') {
                let at = search + offset;
                if let Some((tag, after)) = self.tag_at(at) {
                    self.pos = after;
                    if at > start {
                        self.pending = tag;
                        return Some(Token::Text(&self.src[start..at]));
                    }
                    match tag {
                        Some(token) => return Some(token),
                        // Comment right at the start: keep scanning.
                        None => break,
                    }
                }
                search = at + 1;
            }
            if self.pos == start {
                self.pos = self.src.len();
                return Some(Token::Text(&self.src[start..]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(markup: &str) -> Vec<(TextBlockKind, String)> {
        parse(markup)
            .unwrap()
            .iter()
            .map(|block| (block.kind, block.text.clone()))
            .collect()
    }

    #[test]
    fn paragraph_and_italics() {
        assert_eq!(
            blocks("<p>hello <i>world</i></p>"),
            vec![
                (TextBlockKind::Text, "\n".to_string()),
                (TextBlockKind::Text, "hello ".to_string()),
                (TextBlockKind::Italic, "world".to_string()),
            ]
        );
    }

    #[test]
    fn links_quotes_and_preformatted() {
        assert_eq!(
            blocks("see <a href=\"https://x.y/?a>b\" rel=\"nofollow\">x.y</a><p>> quoted<p><pre><code>  fn x()</code></pre>"),
            vec![
                (TextBlockKind::Text, "see ".to_string()),
                (TextBlockKind::Link, "x.y".to_string()),
                (TextBlockKind::Text, "\n".to_string()),
                (TextBlockKind::Quote, "> quoted".to_string()),
                (TextBlockKind::Text, "\n".to_string()),
                (TextBlockKind::Text, "\n".to_string()),
                (TextBlockKind::Raw, "  fn x()".to_string()),
            ]
        );
    }

    #[test]
    fn stray_angle_brackets_are_text() {
        assert_eq!(
            blocks("a < b and 1<2 <!-- note -->done"),
            vec![
                (TextBlockKind::Text, "a < b and 1<2 ".to_string()),
                (TextBlockKind::Text, "done".to_string()),
            ]
        );
        assert_eq!(
            blocks("open <a href=\"x"),
            vec![(TextBlockKind::Text, "open <a href=\"x".to_string())]
        );
    }

    #[test]
    fn self_closing_tags_are_skipped() {
        assert_eq!(
            blocks("a<br/>b <i>x<hr /></i>"),
            vec![
                (TextBlockKind::Text, "a".to_string()),
                (TextBlockKind::Text, "b ".to_string()),
                (TextBlockKind::Italic, "x".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_tags_are_errors_when_strict() {
        let err = parse("fine <b>bold</b>").unwrap_err();
        assert!(matches!(err, ThreadViewError::UnsupportedMarkup { tag } if tag == "b"));
    }

    #[test]
    fn unknown_tags_fall_back_to_plain_text() {
        let parsed = parse_lossy("<i>a</i><b>bold</b> tail");
        let kinds: Vec<_> = parsed.iter().map(|block| block.kind).collect();
        assert_eq!(
            kinds,
            vec![TextBlockKind::Italic, TextBlockKind::Text, TextBlockKind::Text]
        );
        assert_eq!(parsed.plain_text(), "abold tail");
    }

    #[test]
    fn tag_names_are_case_insensitive() {
        assert_eq!(
            blocks("<I>x</I>"),
            vec![(TextBlockKind::Italic, "x".to_string())]
        );
    }
}
