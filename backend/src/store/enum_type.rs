//! Decoder for the `enum('a','b',...)` column type encoding.
//!
//! The value set of an enumerated column is stored as text by the database,
//! so it is untrusted input: only the exact shape is accepted, and anything
//! else is rejected instead of being interpreted.

/// Parses `enum('v1','v2',...)` into its values, in declaration order.
///
/// Values are single-quoted and separated by a single comma. A quote inside a
/// value is written twice (`''`). The keyword is matched case-insensitively.
/// Returns `None` for any other shape, including an empty value list and
/// trailing characters after the closing parenthesis.
pub fn parse_enum_column(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    let keyword = raw.get(..5)?;
    if !keyword.eq_ignore_ascii_case("enum(") {
        return None;
    }
    let body = raw[5..].strip_suffix(')')?;

    let mut values = Vec::new();
    let mut chars = body.chars().peekable();
    loop {
        if chars.next()? != '\'' {
            return None;
        }
        let mut value = String::new();
        loop {
            match chars.next()? {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    value.push('\'');
                }
                '\'' => break,
                c => value.push(c),
            }
        }
        values.push(value);

        match chars.next() {
            None => return Some(values),
            Some(',') => continue,
            Some(_) => return None,
        }
    }
}
