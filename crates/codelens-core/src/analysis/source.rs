//! Text helpers shared by the scanners: offset to line/character mapping
//! and brace matching.
//!
//! Brace matching is lexical. Braces inside strings and comments are counted
//! like any other, which is an accepted limitation of the heuristic scanners.

use codelens_shared::{Position, Span};

/// Maps byte offsets to 0-based line and character positions
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let character = self
            .text
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - line_start);

        Position {
            offset,
            line,
            character,
        }
    }
}

/// Offset of the `}` closing the `{` at `open`, if the text is balanced from there
pub fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Span of a brace-delimited block starting at `open`. An unbalanced block
/// runs to the end of the text.
pub fn block_span(text: &str, open: usize) -> Span {
    let end = matching_brace(text, open)
        .map(|close| close + 1)
        .unwrap_or(text.len());
    Span { start: open, end }
}

/// Span of an expression-bodied arrow: up to `;`, end of line, or end of text
pub fn expression_span(text: &str, start: usize) -> Span {
    let rest = &text[start..];
    let end = rest
        .find([';', '\n'])
        .map(|i| start + i)
        .unwrap_or(text.len());
    Span { start, end }
}

/// First `{` at or after `from`, stopping at a `;` which ends a bodiless header
pub fn next_open_brace(text: &str, from: usize) -> Option<usize> {
    let rest = text.get(from..)?;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => return Some(from + i),
            ';' => return None,
            _ => {}
        }
    }
    None
}

/// Offsets just past the blocks opened by the `{` at each of `opens`
pub fn block_ends(text: &str, opens: impl IntoIterator<Item = usize>) -> Vec<usize> {
    opens
        .into_iter()
        .filter_map(|open| matching_brace(text, open))
        .map(|close| close + 1)
        .collect()
}

/// Whether only whitespace separates `at` from the end of one of `ends`
pub fn follows_block(text: &str, at: usize, ends: &[usize]) -> bool {
    text.get(..at)
        .is_some_and(|before| ends.contains(&before.trim_end().len()))
}

/// Number of lines a span covers
pub fn line_count(text: &str, span: Span) -> usize {
    text.get(span.start..span.end)
        .map(|s| s.lines().count().max(1))
        .unwrap_or(0)
}

/// Split a raw parameter list into trimmed names
pub fn split_params(raw: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let mut prev = ' ';

    for c in raw.chars() {
        match c {
            '(' | '[' | '{' | '<' => {
                depth += 1;
                current.push(c);
            }
            // `=>` in a default value is not a closing angle bracket
            '>' if prev == '=' => current.push(c),
            ')' | ']' | '}' | '>' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                params.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
        prev = c;
    }
    params.push(current);

    params
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
