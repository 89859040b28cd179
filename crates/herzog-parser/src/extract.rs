//! Cell extractor
//!
//! Turns a located block into cell content: the structural indentation is removed,
//! the markdown delimiter is unwrapped, placeholder statements are dropped and
//! escaped magic/shell lines are restored.

use crate::cell::{Cell, CellKind};
use crate::locator::{LocatedBlock, SourceSpan, named_children};
use crate::parser::{ParseError, ParseResult};
use std::borrow::Cow;

/// Script form of a notebook shell-escape line (`!ls`)
pub const SHELL_MARKER: &str = "#!";
/// Script form of a notebook magic line (`%matplotlib inline`)
pub const MAGIC_MARKER: &str = "#%";
/// No-op statement standing in for an empty cell body
pub const PLACEHOLDER: &str = "pass";
/// String prefix of a markdown literal whose `\\` and `\"` escapes are decoded
pub const ESCAPED_PREFIX: &str = "u";

/// Extract the content of a located block
///
/// `lines` are the script's physical lines, without terminators.
pub fn extract(block: &LocatedBlock<'_>, source: &str, lines: &[&str]) -> ParseResult<Cell> {
    let span = &block.span;
    if span.start > span.end {
        return Err(ParseError::MalformedCell {
            line: span.line(),
            reason: "expected cell content".to_string(),
        });
    }

    let content = match block.kind {
        CellKind::Executable => executable_content(lines, span)?,
        CellKind::Prose => prose_content(block, source)?,
        CellKind::Scoped => span_lines(lines, span)
            .map(|(_, line)| dedent_lenient(line, span.indent).to_string())
            .collect(),
    };

    Ok(Cell::new(block.kind, content))
}

/// Remove exactly `indent` leading whitespace characters
///
/// Whitespace-only lines become empty. `line_no` is 1-indexed and only used for errors.
pub fn dedent(line: &str, indent: usize, line_no: usize) -> ParseResult<&str> {
    if line.trim().is_empty() {
        return Ok("");
    }
    let bytes = line.as_bytes();
    if bytes.len() < indent || !bytes[..indent].iter().all(|b| matches!(b, b' ' | b'\t')) {
        return Err(ParseError::Indentation { line: line_no });
    }
    Ok(&line[indent..])
}

/// Remove up to `indent` leading whitespace characters
fn dedent_lenient(line: &str, indent: usize) -> &str {
    let width = line
        .bytes()
        .take(indent)
        .take_while(|b| matches!(b, b' ' | b'\t'))
        .count();
    &line[width..]
}

/// Restore a notebook magic/shell line from its script form
pub fn unescape_line(line: &str) -> &str {
    if line.starts_with(SHELL_MARKER) || line.starts_with(MAGIC_MARKER) {
        &line[1..]
    } else {
        line
    }
}

/// Comment out a notebook magic/shell line for the script form
pub fn escape_line(line: &str) -> Cow<'_, str> {
    if line.starts_with('!') || line.starts_with('%') {
        Cow::Owned(format!("#{line}"))
    } else {
        Cow::Borrowed(line)
    }
}

/// Escape a markdown line for a `u"""` literal
///
/// Backslashes are doubled and every `"""` becomes `\"\"\"`, so no run of three
/// unescaped quotes is left. [`unescape_prose_line`] is the exact inverse.
pub fn escape_prose_line(line: &str) -> String {
    line.replace('\\', r"\\").replace(r#"""""#, r#"\"\"\""#)
}

/// Decode the `\\` and `\"` escapes of a `u"""` literal line
///
/// Other backslash sequences are kept as written.
pub fn unescape_prose_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('\\' | '"')) => out.push(next),
            Some(next) => {
                out.push(c);
                out.push(next);
            }
            None => out.push(c),
        }
    }
    out
}

fn span_lines<'a>(
    lines: &'a [&'a str],
    span: &SourceSpan,
) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    (span.start..=span.end).map(move |row| (row, lines.get(row).copied().unwrap_or("")))
}

fn executable_content(lines: &[&str], span: &SourceSpan) -> ParseResult<Vec<String>> {
    let mut content = Vec::new();
    for (row, line) in span_lines(lines, span) {
        let line = dedent(line, span.indent, row + 1)?;
        if line.trim_end() == PLACEHOLDER {
            continue;
        }
        content.push(unescape_line(line).to_string());
    }

    while content.last().is_some_and(|line| line.is_empty()) {
        content.pop();
    }
    Ok(content)
}

/// Content of a markdown block: the text of its single string literal
fn prose_content(block: &LocatedBlock<'_>, source: &str) -> ParseResult<Vec<String>> {
    let malformed = || ParseError::MalformedCell {
        line: block.span.line(),
        reason: "markdown cell must contain a single string literal".to_string(),
    };

    let statements = named_children(block.body);
    let [statement] = statements.as_slice() else {
        return Err(malformed());
    };
    let values = named_children(*statement);
    let literal = match (statement.kind(), values.as_slice()) {
        ("expression_statement", [value]) if value.kind() == "string" => *value,
        _ => return Err(malformed()),
    };

    let text = &source[literal.start_byte()..literal.end_byte()];
    let first_row = literal.start_position().row;
    let indent = block.span.indent;

    let mut content = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let line = if i == 0 {
            line
        } else {
            dedent(line, indent, first_row + i + 1)?
        };
        content.push(line.to_string());
    }

    let (quote, escaped) = strip_delimiters(&mut content).ok_or_else(malformed)?;
    tracing::trace!(quote, escaped, lines = content.len(), "Unwrapped markdown literal");
    if escaped {
        for line in &mut content {
            *line = unescape_prose_line(line);
        }
    }

    // Delimiter-only lines are blank now
    trim_blank_lines(&mut content);
    Ok(content)
}

/// Strip the string prefix and quotes from the first and last literal lines
///
/// Also reports whether the prefix marks an escaped literal. Unprefixed and raw
/// literals are kept verbatim.
fn strip_delimiters(content: &mut [String]) -> Option<(&'static str, bool)> {
    let first = content.first()?;
    let body = first.trim_start_matches(['r', 'R', 'u', 'U']);
    let escaped = first[..first.len() - body.len()].eq_ignore_ascii_case(ESCAPED_PREFIX);
    let quote = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|q| body.starts_with(q))?;
    content[0] = body[quote.len()..].to_string();

    let last = content.last_mut()?;
    *last = last.strip_suffix(quote)?.to_string();
    Some((quote, escaped))
}

fn trim_blank_lines(content: &mut Vec<String>) {
    while content.last().is_some_and(|line| line.trim().is_empty()) {
        content.pop();
    }
    let leading = content
        .iter()
        .take_while(|line| line.trim().is_empty())
        .count();
    content.drain(..leading);
}
