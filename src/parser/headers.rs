//! Case-insensitive, multi-value header container.

use std::fmt;

/// An ordered multimap of HTTP headers.
///
/// Names are stored normalized (`content-TYPE` becomes `Content-type`) and
/// every lookup normalizes the queried name, so lookups ignore case.
/// Distinct names keep their insertion order, as do the values stored under
/// one name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

/// Upper-case the first character of a header name and lower-case the rest.
fn normalize_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

impl Headers {
    /// Create an empty header container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `name`, keeping any values already stored for it.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        let name = normalize_name(name);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Builder form of [`Headers::add`].
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// The first value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// The first value stored under `name`, or `default` when it is absent.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Every value stored under `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        let name = normalize_name(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Whether at least one value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        !self.get_all(name).is_empty()
    }

    /// Number of stored values (one per serialized line).
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }

    /// Whether no header has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, values)| {
            values.iter().map(move |value| (name.as_str(), value.as_str()))
        })
    }
}

/// Serializes as one `Name: value\r\n` line per stored value.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}
