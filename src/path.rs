//! Path expressions over decoded bodies
//!
//! A path is a dot-separated list of field names, each optionally followed by
//! any number of `[index]` or `["key"]` accessors:
//!
//! ```text
//! Setting.Email
//! Permission[1]
//! Preference["email"]
//! Groups[0].Members[2]["name"]
//! ```
//!
//! Extraction works on the generic [`Value`] tree produced by every codec,
//! so JSON and binary bodies resolve the same way.

use serde_json::Value;

/// One step of a parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Field of an object (`Setting`)
    Field(&'a str),
    /// Position in an array (`[1]`)
    Index(usize),
    /// String key of an object (`["email"]`)
    Key(&'a str),
}

/// Parse a path expression into its segments.
///
/// Returns `None` for malformed expressions: empty input, empty field names
/// (an accessor may stand alone only at the start, as in `[0].id`),
/// unterminated brackets, non-numeric indexes or trailing garbage after `]`.
pub fn parse(path: &str) -> Option<Vec<Segment<'_>>> {
    if path.is_empty() {
        return None;
    }

    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut i = 0;

    loop {
        let start = i;
        while i < bytes.len() && bytes[i] != b'.' && bytes[i] != b'[' {
            i += 1;
        }

        if i > start {
            segments.push(Segment::Field(&path[start..i]));
        } else if start > 0 || i >= bytes.len() || bytes[i] != b'[' {
            // Only the first segment may omit its field name
            return None;
        }

        while i < bytes.len() && bytes[i] == b'[' {
            let (segment, next) = parse_accessor(path, i)?;
            segments.push(segment);
            i = next;
        }

        match bytes.get(i) {
            None => break,
            Some(b'.') => {
                i += 1;
                if i == bytes.len() {
                    return None;
                }
            }
            Some(_) => return None,
        }
    }

    Some(segments)
}

/// Parse one `[...]` accessor starting at `open`, returning the segment and
/// the offset just past the closing bracket.
fn parse_accessor(path: &str, open: usize) -> Option<(Segment<'_>, usize)> {
    let rest = &path[open + 1..];

    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find("\"]")?;
        let key = &quoted[..end];
        // open + '[' + '"' + key + '"' + ']'
        return Some((Segment::Key(key), open + 2 + end + 2));
    }

    let end = rest.find(']')?;
    let digits = &rest[..end];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((Segment::Index(index), open + 1 + end + 1))
}

/// Resolve `path` against `value`.
///
/// Returns `None` when the path is malformed, a field is missing, an index is
/// out of range or an intermediate value has the wrong shape. Never panics.
pub fn extract<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    parse(path)?
        .into_iter()
        .try_fold(value, |current, segment| step(current, &segment))
}

fn step<'v>(value: &'v Value, segment: &Segment<'_>) -> Option<&'v Value> {
    match (segment, value) {
        (Segment::Field(name) | Segment::Key(name), Value::Object(map)) => map.get(*name),
        (Segment::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    }
}
