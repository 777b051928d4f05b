//! Tokenizer and greedy line wrapper
//!
//! Text is split into whitespace runs, words, and reference spans such as
//! `3:16-18`. Lines are packed greedily against a pixel width. Reference
//! spans move between lines as one unit; the only operation that cuts inside
//! a token is the grapheme fallback for a token wider than the whole box.

use super::measure::{FontSpec, FontWeight, MeasureText};
use super::reference::find_reference_spans;
use std::borrow::Cow;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Word,
    AtomicReference,
}

/// One lexical unit of a line's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    fn new(text: &str, kind: TokenKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }
}

/// Split `text` into tokens. Concatenating the token texts in order gives
/// back `text` exactly.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for span in find_reference_spans(text) {
        if span.start < cursor {
            continue;
        }
        push_plain_tokens(&mut tokens, &text[cursor..span.start]);
        tokens.push(Token::new(&text[span.clone()], TokenKind::AtomicReference));
        cursor = span.end;
    }
    push_plain_tokens(&mut tokens, &text[cursor..]);

    tokens
}

/// Alternating whitespace runs and words
fn push_plain_tokens(tokens: &mut Vec<Token>, segment: &str) {
    let mut run_start = 0;
    let mut run_is_space: Option<bool> = None;

    for (index, ch) in segment.char_indices() {
        let is_space = ch.is_whitespace();
        match run_is_space {
            Some(current) if current != is_space => {
                tokens.push(plain_token(&segment[run_start..index], current));
                run_start = index;
                run_is_space = Some(is_space);
            }
            None => run_is_space = Some(is_space),
            _ => {}
        }
    }

    if let Some(current) = run_is_space {
        tokens.push(plain_token(&segment[run_start..], current));
    }
}

fn plain_token(text: &str, is_space: bool) -> Token {
    let kind = if is_space {
        TokenKind::Whitespace
    } else {
        TokenKind::Word
    };
    Token::new(text, kind)
}

/// Wrap `text` into lines no wider than `max_width` at the given font.
///
/// Blank input produces a single empty line. Lines come back trimmed and in
/// reading order.
pub fn wrap_text<M: MeasureText + ?Sized>(
    measure: &M,
    text: &str,
    max_width: f32,
    font_size: f32,
    weight: FontWeight,
) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![String::new()];
    }

    let font = FontSpec::new(font_size, weight);
    let mut lines = Vec::new();
    let mut current = String::new();

    for token in tokenize(text) {
        let piece = drawable_text(&token);
        let candidate = if token.is_whitespace() {
            format!("{}{}", current, piece)
        } else {
            let needs_separator = !current.is_empty() && !current.ends_with(char::is_whitespace);
            let separator = if needs_separator { " " } else { "" };
            format!("{}{}{}", current, separator, piece)
        };

        if measure.measure_width(&candidate, font) > max_width && !current.trim().is_empty() {
            lines.push(current.trim().to_string());
            current = if token.is_whitespace() {
                String::new()
            } else {
                piece.into_owned()
            };
        } else {
            current = candidate;
        }
    }

    if !current.trim().is_empty() {
        lines.push(current.trim().to_string());
    }

    let mut wrapped = Vec::with_capacity(lines.len());
    for line in lines {
        if measure.measure_width(&line, font) <= max_width {
            wrapped.push(line);
        } else {
            log::debug!("breaking oversized line {:?} at grapheme level", line);
            break_graphemes(measure, &line, max_width, font, &mut wrapped);
        }
    }

    if wrapped.is_empty() {
        wrapped.push(text.to_string());
    }
    wrapped
}

/// Token text as it may appear on a painted line: runs of spaces pass
/// through, any other whitespace (tabs, newlines, no-break spaces) becomes
/// a single space.
fn drawable_text(token: &Token) -> Cow<'_, str> {
    let has_control = |text: &str| text.chars().any(|c| c.is_whitespace() && c != ' ');
    match token.kind {
        TokenKind::Whitespace if has_control(token.text.as_str()) => Cow::Borrowed(" "),
        TokenKind::AtomicReference if has_control(token.text.as_str()) => Cow::Owned(
            token
                .text
                .chars()
                .map(|c| if c.is_whitespace() { ' ' } else { c })
                .collect(),
        ),
        _ => Cow::Borrowed(&token.text),
    }
}

/// Last-resort split of a single line. Every emitted piece holds at least
/// one grapheme, even when that grapheme alone is wider than `max_width`.
fn break_graphemes<M: MeasureText + ?Sized>(
    measure: &M,
    line: &str,
    max_width: f32,
    font: FontSpec,
    out: &mut Vec<String>,
) {
    let mut piece = String::new();

    for grapheme in line.graphemes(true) {
        let candidate = format!("{}{}", piece, grapheme);
        if measure.measure_width(&candidate, font) > max_width && !piece.is_empty() {
            out.push(std::mem::take(&mut piece));
            piece.push_str(grapheme);
        } else {
            piece = candidate;
        }
    }

    if !piece.is_empty() {
        out.push(piece);
    }
}

/// Total stacked height of `text` once wrapped, at `line_height` × size per row
pub fn wrapped_height<M: MeasureText + ?Sized>(
    measure: &M,
    text: &str,
    max_width: f32,
    font_size: f32,
    weight: FontWeight,
    line_height: f32,
) -> f32 {
    let rows = wrap_text(measure, text, max_width, font_size, weight).len();
    rows as f32 * font_size * line_height
}
