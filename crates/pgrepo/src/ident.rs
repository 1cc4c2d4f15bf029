//! SQL identifier quoting.
//!
//! Table and column names are spliced into SQL text (Postgres cannot bind
//! identifiers as parameters), so every name goes through [`quote`]:
//!
//! - the name is wrapped in double quotes
//! - every embedded `"` is escaped as `""`
//!
//! No other validation is performed. Names are expected to come from a
//! record's static field table, so this only prevents a name from breaking
//! out of its quotes.
//!
//! # Example
//! ```ignore
//! assert_eq!(pgrepo::ident::quote("examples"), r#""examples""#);
//! assert_eq!(pgrepo::ident::quote(r#"a"b"#), r#""a""b""#);
//! ```

/// Quote a raw name as a SQL identifier.
pub fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name);
    out
}

pub(crate) fn write_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

/// Reverse [`quote`].
///
/// Returns `None` unless `quoted` is exactly one quoted identifier: opening
/// quote, body with every `"` doubled, closing quote, nothing after it.
pub fn unquote(quoted: &str) -> Option<String> {
    let mut chars = quoted.chars().peekable();
    if chars.next() != Some('"') {
        return None;
    }

    let mut name = String::with_capacity(quoted.len());
    loop {
        match chars.next() {
            Some('"') => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    name.push('"');
                } else {
                    break;
                }
            }
            Some(c) => name.push(c),
            None => return None,
        }
    }

    // Anything after the closing quote means the identifier was broken out of.
    if chars.next().is_some() {
        return None;
    }
    Some(name)
}
