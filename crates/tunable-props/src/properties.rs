//! Java-style `.properties` text
//!
//! ```text
//! # comment            ! also a comment
//! key = value          key:value          key value
//! long.value = first \
//!              second
//! escaped\ key = tab\there \u00e9
//! ```
//!
//! Whitespace here means space, tab and form feed only.

use crate::error::{PropsError, PropsResult};
use std::collections::BTreeMap;

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn is_comment(line: &str) -> bool {
    line.starts_with(|c: char| c == '#' || c == '!')
}

/// A line continues when it ends in an odd number of backslashes
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Parse `.properties` text into a map; later keys win
///
/// # Errors
/// Returns [`PropsError::Syntax`] for a malformed `\u` escape or an
/// unpaired surrogate
pub fn parse(text: &str) -> PropsResult<BTreeMap<String, String>> {
    let mut entries = BTreeMap::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, physical)) = lines.next() {
        let line = index + 1;
        let trimmed = physical.trim_start_matches(is_blank);
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }

        let mut logical = trimmed.to_string();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        entries.insert(unescape(key, line)?, unescape(value, line)?);
    }

    Ok(entries)
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace
fn split_entry(logical: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = logical.len();
    for (i, c) in logical.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let key = &logical[..key_end];
    let mut rest = logical[key_end..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> PropsResult<String> {
    let mut out = String::with_capacity(raw.len());
    // UTF-16 units from consecutive \u escapes, so surrogate pairs decode
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut units, &mut out, line)?;
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        if escaped == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                return Err(PropsError::syntax(line, format!("malformed \\u escape: \\u{hex}")));
            }
            let unit = u16::from_str_radix(&hex, 16)
                .map_err(|e| PropsError::syntax(line, e.to_string()))?;
            units.push(unit);
            continue;
        }
        flush_units(&mut units, &mut out, line)?;
        out.push(match escaped {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{c}',
            other => other,
        });
    }

    flush_units(&mut units, &mut out, line)?;
    Ok(out)
}

fn flush_units(units: &mut Vec<u16>, out: &mut String, line: usize) -> PropsResult<()> {
    if units.is_empty() {
        return Ok(());
    }
    for decoded in char::decode_utf16(units.drain(..)) {
        let c = decoded.map_err(|e| {
            PropsError::syntax(
                line,
                format!("unpaired surrogate {:#06x}", e.unpaired_surrogate()),
            )
        })?;
        out.push(c);
    }
    Ok(())
}

/// Escape text so [`parse`] reads it back unchanged
#[must_use]
pub fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            c if c.is_control() => {
                let mut buf = [0_u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{unit:04X}"));
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Render entries as `.properties` text
///
/// Keys with an entry in `comments` get a `# comment` line above them.
#[must_use]
pub fn render(entries: &BTreeMap<String, String>, comments: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        if let Some(comment) = comments.get(key) {
            out.push_str("# ");
            out.push_str(&comment.replace(|c: char| c == '\r' || c == '\n', " "));
            out.push('\n');
        }
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}
