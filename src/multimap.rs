//! Ordered multi-valued collections for query parameters and headers

use hyper::HeaderMap;

/// Names in arrival order, each with every value received for it.
///
/// Lookups by name return the first value; [`get_all`](Self::get_all) returns
/// the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedMultimap {
    entries: Vec<(String, Vec<String>)>,
}

impl OrderedMultimap {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, keeping the position of the first occurrence of `name`
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// First value received for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Every value received for `name`, in arrival order
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// Whether any value was received for `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Iterate names with their values
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct names
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    ///
    /// Pairs without `=` get an empty value; pairs that are not valid UTF-8
    /// after percent-decoding are skipped.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            match (decode_component(name), decode_component(value)) {
                (Some(name), Some(value)) => params.append(name, value),
                _ => tracing::debug!("Skipping undecodable query pair: {}", pair),
            }
        }
        params
    }

    /// Collect headers under their canonical names (`content-type` becomes
    /// `Content-Type`). Values that are not visible ASCII are decoded lossily.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut collected = Self::new();
        for (name, value) in headers {
            let value = match value.to_str() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            collected.append(canonical_header_name(name.as_str()), value);
        }
        collected
    }
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}

/// Canonical MIME header form: the first letter and every letter following a
/// hyphen are upper-cased, the rest lower-cased.
#[must_use]
pub fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}
