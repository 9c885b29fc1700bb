use super::Dialect;

/// A lexical slice of SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Segment<'a> {
    /// Plain SQL, where markers are recognized.
    Code(&'a str),
    /// A quoted identifier: backticks, or double quotes in the standard
    /// dialect.
    Ident(&'a str),
    /// String literals, comments, dollar-quoted bodies and MySQL
    /// double-quoted strings.
    Opaque(&'a str),
}

impl<'a> Segment<'a> {
    pub(super) fn as_str(&self) -> &'a str {
        match self {
            Segment::Code(s) | Segment::Ident(s) | Segment::Opaque(s) => s,
        }
    }
}

/// Split `sql` into code and non-code segments. Unterminated quotes and
/// comments run to the end of the input.
pub(super) fn segments(sql: &str, dialect: Dialect) -> Vec<Segment<'_>> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let found = match bytes[idx] {
            b'\'' => Some((
                scan_quoted(bytes, idx, b'\'', dialect.backslash_escapes()),
                false,
            )),
            b'"' => match dialect {
                Dialect::MySql => Some((scan_quoted(bytes, idx, b'"', true), false)),
                Dialect::Standard => Some((scan_quoted(bytes, idx, b'"', false), true)),
            },
            b'`' => Some((scan_quoted(bytes, idx, b'`', false), true)),
            _ if is_line_comment_start(bytes, idx, dialect) => {
                Some((scan_line_comment(bytes, idx), false))
            }
            _ if is_block_comment_start(bytes, idx) => {
                Some((scan_block_comment(bytes, idx, dialect), false))
            }
            b'$' if dialect == Dialect::Standard => try_start_dollar_quote(bytes, idx)
                .map(|(tag, tag_end)| (scan_dollar_quoted(bytes, tag_end, &tag), false)),
            _ => None,
        };

        match found {
            Some((end, ident)) => {
                if code_start < idx {
                    out.push(Segment::Code(&sql[code_start..idx]));
                }
                let text = &sql[idx..end];
                out.push(if ident {
                    Segment::Ident(text)
                } else {
                    Segment::Opaque(text)
                });
                idx = end;
                code_start = end;
            }
            None => idx += 1,
        }
    }

    if code_start < bytes.len() {
        out.push(Segment::Code(&sql[code_start..]));
    }
    out
}

/// Returns the index just past the closing quote.
fn scan_quoted(bytes: &[u8], start: usize, quote: u8, backslash_escapes: bool) -> usize {
    let mut idx = start + 1;
    while idx < bytes.len() {
        let b = bytes[idx];
        if backslash_escapes && b == b'\\' {
            idx += 2;
            continue;
        }
        if b == quote {
            if bytes.get(idx + 1) == Some(&quote) {
                idx += 2; // doubled quote
                continue;
            }
            return idx + 1;
        }
        idx += 1;
    }
    bytes.len()
}

fn is_line_comment_start(bytes: &[u8], idx: usize, dialect: Dialect) -> bool {
    match bytes[idx] {
        b'#' => dialect == Dialect::MySql,
        b'-' if bytes.get(idx + 1) == Some(&b'-') => match dialect {
            // MySQL requires whitespace (or end of input) after `--`
            Dialect::MySql => bytes
                .get(idx + 2)
                .map_or(true, |b| b.is_ascii_whitespace()),
            Dialect::Standard => true,
        },
        _ => false,
    }
}

fn scan_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| start + offset + 1)
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Postgres block comments nest, MySQL ones do not.
fn scan_block_comment(bytes: &[u8], start: usize, dialect: Dialect) -> usize {
    let mut depth = 1u32;
    let mut idx = start + 2;
    while idx < bytes.len() {
        if is_block_comment_end(bytes, idx) {
            depth -= 1;
            idx += 2;
            if depth == 0 {
                return idx;
            }
        } else if dialect == Dialect::Standard && is_block_comment_start(bytes, idx) {
            depth += 1;
            idx += 2;
        } else {
            idx += 1;
        }
    }
    bytes.len()
}

/// Recognizes `$tag$`; returns the tag and the index of its closing `$`.
fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    // `$1` is a parameter, not a tag
    if bytes.get(start + 1).is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

fn scan_dollar_quoted(bytes: &[u8], tag_end: usize, tag: &str) -> usize {
    let closing = format!("${tag}$");
    let body_start = tag_end + 1;
    if body_start >= bytes.len() {
        return bytes.len();
    }
    bytes[body_start..]
        .windows(closing.len())
        .position(|w| w == closing.as_bytes())
        .map_or(bytes.len(), |offset| body_start + offset + closing.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_literals_and_comments() {
        let sql = "SELECT 'a?' , x -- c?\nFROM t /* ? */ WHERE y = ?";
        let segs = segments(sql, Dialect::MySql);
        assert_eq!(
            segs,
            vec![
                Segment::Code("SELECT "),
                Segment::Opaque("'a?'"),
                Segment::Code(" , x "),
                Segment::Opaque("-- c?\n"),
                Segment::Code("FROM t "),
                Segment::Opaque("/* ? */"),
                Segment::Code(" WHERE y = ?"),
            ]
        );
    }

    #[test]
    fn mysql_backslash_escape_does_not_close_string() {
        let sql = r"SELECT 'it\'s ?' , ?";
        let segs = segments(sql, Dialect::MySql);
        assert_eq!(segs[1], Segment::Opaque(r"'it\'s ?'"));
        assert_eq!(segs[2], Segment::Code(" , ?"));
    }

    #[test]
    fn standard_doubled_quote_does_not_close_string() {
        let sql = "SELECT 'it''s ?', ?";
        let segs = segments(sql, Dialect::Standard);
        assert_eq!(segs[1], Segment::Opaque("'it''s ?'"));
        assert_eq!(segs[2], Segment::Code(", ?"));
    }

    #[test]
    fn backticks_are_identifiers() {
        let segs = segments("SELECT * FROM `wk_users`", Dialect::MySql);
        assert_eq!(segs[1], Segment::Ident("`wk_users`"));
    }

    #[test]
    fn double_quotes_depend_on_dialect() {
        let segs = segments(r#"SELECT "{{users}}".id FROM "{{users}}""#, Dialect::Standard);
        assert_eq!(segs[1], Segment::Ident(r#""{{users}}""#));
        assert_eq!(segs[3], Segment::Ident(r#""{{users}}""#));

        let segs = segments(r#"SELECT "a"b?""#, Dialect::MySql);
        assert_eq!(segs[1], Segment::Opaque(r#""a"b?""#));
    }

    #[test]
    fn hash_comment_only_in_mysql() {
        let segs = segments("SELECT 1 # note ?\n", Dialect::MySql);
        assert_eq!(segs[1], Segment::Opaque("# note ?\n"));

        let segs = segments("SELECT 1 # 2", Dialect::Standard);
        assert_eq!(segs, vec![Segment::Code("SELECT 1 # 2")]);
    }

    #[test]
    fn mysql_double_dash_needs_whitespace() {
        let segs = segments("SELECT 1--1", Dialect::MySql);
        assert_eq!(segs, vec![Segment::Code("SELECT 1--1")]);
    }

    #[test]
    fn dollar_quoted_bodies_are_opaque() {
        let sql = "SELECT $fn$ ? $fn$, $1";
        let segs = segments(sql, Dialect::Standard);
        assert_eq!(
            segs,
            vec![
                Segment::Code("SELECT "),
                Segment::Opaque("$fn$ ? $fn$"),
                Segment::Code(", $1"),
            ]
        );
    }

    #[test]
    fn nested_block_comments_in_standard() {
        let sql = "/* a /* b */ c */ ?";
        let segs = segments(sql, Dialect::Standard);
        assert_eq!(segs[0], Segment::Opaque("/* a /* b */ c */"));
        assert_eq!(segs[1], Segment::Code(" ?"));
    }

    #[test]
    fn unterminated_literal_runs_to_end() {
        let segs = segments("SELECT 'oops ?", Dialect::MySql);
        assert_eq!(segs[1], Segment::Opaque("'oops ?"));
    }
}
