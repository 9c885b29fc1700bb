//! SQL text pre-processing: argument substitution and table-prefix rewriting.
//!
//! Both passes work on text with a lightweight scanner that skips string
//! literals, double-quoted text, comments and dollar-quoted bodies. They are
//! a best-effort convenience, not a SQL parser: exotic syntax (for example
//! Postgres `?` JSON operators, or `:word` outside a literal) can still be
//! mistaken for a marker.

use std::borrow::Cow;

use crate::error::{DbError, Result};
use crate::types::{Args, SqlValue};

mod scanner;

use scanner::{segments, Segment};

/// SQL flavor used for quoting and comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Backslash escapes in strings, `#` comments, `1`/`0` booleans.
    MySql,
    /// Standard-conforming strings (Postgres): doubled quotes only.
    Standard,
}

impl Dialect {
    fn backslash_escapes(self) -> bool {
        matches!(self, Dialect::MySql)
    }
}

/// Substitute `?` and `:name` markers with rendered argument values.
///
/// Returns the template unchanged when `args` is empty.
///
/// # Example
/// ```
/// use sqladapter::query_text::{format, Dialect};
/// use sqladapter::Args;
///
/// let sql = format(
///     "SELECT * FROM users WHERE name = ? AND age > ?",
///     &Args::positional(["O'Brien".into(), sqladapter::SqlValue::Int32(30)]),
///     Dialect::MySql,
/// ).unwrap();
/// assert_eq!(sql, r"SELECT * FROM users WHERE name = 'O\'Brien' AND age > 30");
/// ```
pub fn format(sql: &str, args: &Args, dialect: Dialect) -> Result<String> {
    if args.is_empty() {
        return Ok(sql.to_string());
    }

    let mut out = String::with_capacity(sql.len() + 16 * args.len());
    let mut next_positional = 0usize;

    for segment in segments(sql, dialect) {
        match segment {
            Segment::Code(code) => {
                substitute(code, args, dialect, &mut next_positional, &mut out)?
            }
            other => out.push_str(other.as_str()),
        }
    }

    if let Args::Positional(values) = args {
        if next_positional < values.len() {
            return Err(DbError::Format(format!(
                "{} argument(s) supplied but only {} marker(s) found",
                values.len(),
                next_positional
            )));
        }
    }

    Ok(out)
}

fn substitute(
    code: &str,
    args: &Args,
    dialect: Dialect,
    next_positional: &mut usize,
    out: &mut String,
) -> Result<()> {
    let bytes = code.as_bytes();
    let mut copied = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        match bytes[idx] {
            b'?' => {
                let value = match args {
                    Args::Positional(values) => values.get(*next_positional).ok_or_else(|| {
                        DbError::Format(format!(
                            "no argument for positional marker #{}",
                            *next_positional + 1
                        ))
                    })?,
                    _ => {
                        return Err(DbError::Format(
                            "positional marker `?` used without positional arguments".to_string(),
                        ))
                    }
                };
                *next_positional += 1;
                out.push_str(&code[copied..idx]);
                render_value(value, dialect, out)?;
                idx += 1;
                copied = idx;
            }
            b':' if bytes.get(idx + 1) == Some(&b':') => idx += 2,
            b':' if bytes.get(idx + 1).is_some_and(|&b| is_name_start(b)) => {
                let name_end = scan_name(bytes, idx + 1);
                let name = &code[idx + 1..name_end];
                let value = match args {
                    Args::Named(values) => values.get(name).ok_or_else(|| {
                        DbError::Format(format!("no argument for named marker :{name}"))
                    })?,
                    _ => {
                        return Err(DbError::Format(format!(
                            "named marker :{name} used without named arguments"
                        )))
                    }
                };
                out.push_str(&code[copied..idx]);
                render_value(value, dialect, out)?;
                idx = name_end;
                copied = idx;
            }
            _ => idx += 1,
        }
    }

    out.push_str(&code[copied..]);
    Ok(())
}

fn render_value(value: &SqlValue, dialect: Dialect, out: &mut String) -> Result<()> {
    match value {
        SqlValue::Null => out.push_str("NULL"),
        SqlValue::Int32(v) => push_number(&v.to_string(), out),
        SqlValue::Int64(v) => push_number(&v.to_string(), out),
        SqlValue::Float64(v) => {
            if !v.is_finite() {
                return Err(DbError::Format(format!(
                    "{v} cannot be written as a SQL literal"
                )));
            }
            push_number(&v.to_string(), out);
        }
        SqlValue::Bool(b) => out.push_str(match (dialect, *b) {
            (Dialect::MySql, true) => "1",
            (Dialect::MySql, false) => "0",
            (Dialect::Standard, true) => "TRUE",
            (Dialect::Standard, false) => "FALSE",
        }),
        SqlValue::Text(s) => quote_text(s, dialect, out)?,
        SqlValue::List(items) => {
            if items.is_empty() {
                return Err(DbError::Format("empty list argument".to_string()));
            }
            for (i, item) in items.iter().enumerate() {
                if matches!(item, SqlValue::List(_)) {
                    return Err(DbError::Format("nested list argument".to_string()));
                }
                if i > 0 {
                    out.push_str(", ");
                }
                render_value(item, dialect, out)?;
            }
        }
    }
    Ok(())
}

/// Negative numbers are parenthesized so a preceding `-` cannot form a
/// `--` comment.
fn push_number(text: &str, out: &mut String) {
    if text.starts_with('-') {
        out.push('(');
        out.push_str(text);
        out.push(')');
    } else {
        out.push_str(text);
    }
}

/// Quote and escape a string literal.
fn quote_text(s: &str, dialect: Dialect, out: &mut String) -> Result<()> {
    out.reserve(s.len() + 2);
    out.push('\'');
    match dialect {
        Dialect::MySql => {
            for ch in s.chars() {
                match ch {
                    '\0' => out.push_str("\\0"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '"' => out.push_str("\\\""),
                    '\x1a' => out.push_str("\\Z"),
                    c => out.push(c),
                }
            }
        }
        Dialect::Standard => {
            if s.contains('\0') {
                return Err(DbError::Format(
                    "text argument contains a NUL byte".to_string(),
                ));
            }
            for ch in s.chars() {
                if ch == '\'' {
                    out.push('\'');
                }
                out.push(ch);
            }
        }
    }
    out.push('\'');
    Ok(())
}

/// Rewrite table markers to `prefix + name`.
///
/// `{{name}}` always becomes `{prefix}name`. When `bare_marker` is set (for
/// example `wk_`), an identifier starting with it becomes `{prefix}rest`,
/// unless it already starts with `prefix`. Rewrites apply to plain SQL and
/// quoted identifiers (backticks, or double quotes in the standard dialect);
/// literals and comments are left alone.
///
/// # Example
/// ```
/// use sqladapter::query_text::{apply_table_prefix, Dialect};
///
/// let sql = apply_table_prefix("SELECT * FROM {{users}}", "app_", None, Dialect::MySql);
/// assert_eq!(sql, "SELECT * FROM app_users");
/// ```
pub fn apply_table_prefix<'a>(
    sql: &'a str,
    prefix: &str,
    bare_marker: Option<&str>,
    dialect: Dialect,
) -> Cow<'a, str> {
    let bare_marker = bare_marker.filter(|m| !m.is_empty());
    let has_braced = sql.contains("{{");
    let has_bare = bare_marker.is_some_and(|m| sql.contains(m));
    if !has_braced && !has_bare {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len() + 16);
    for segment in segments(sql, dialect) {
        match segment {
            Segment::Code(text) | Segment::Ident(text) => {
                rewrite_markers(text, prefix, bare_marker, &mut out)
            }
            Segment::Opaque(text) => out.push_str(text),
        }
    }

    if out == sql {
        Cow::Borrowed(sql)
    } else {
        Cow::Owned(out)
    }
}

fn rewrite_markers(text: &str, prefix: &str, bare_marker: Option<&str>, out: &mut String) {
    let bytes = text.as_bytes();
    let mut copied = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx..].starts_with(b"{{") {
            let name_end = scan_name(bytes, idx + 2);
            if name_end > idx + 2 && bytes[name_end..].starts_with(b"}}") {
                out.push_str(&text[copied..idx]);
                out.push_str(prefix);
                out.push_str(&text[idx + 2..name_end]);
                idx = name_end + 2;
                copied = idx;
                continue;
            }
        }

        if let Some(marker) = bare_marker {
            let at_boundary = idx == 0 || !is_name_byte(bytes[idx - 1]);
            if at_boundary
                && bytes[idx..].starts_with(marker.as_bytes())
                && bytes.get(idx + marker.len()).is_some_and(|&b| is_name_byte(b))
                && (prefix.is_empty() || !bytes[idx..].starts_with(prefix.as_bytes()))
            {
                out.push_str(&text[copied..idx]);
                out.push_str(prefix);
                idx += marker.len();
                copied = idx;
                continue;
            }
        }

        idx += 1;
    }

    out.push_str(&text[copied..]);
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn scan_name(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && is_name_byte(bytes[idx]) {
        idx += 1;
    }
    idx
}
