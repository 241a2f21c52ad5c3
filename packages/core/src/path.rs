//! Dotted key paths addressing values inside nested JSON objects.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors related to key path parsing and validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyPathError {
    /// The key path has no components, so it addresses nothing.
    #[error("key path must contain at least one key")]
    Empty,
    /// The key path string could not be parsed.
    #[error("malformed key path {path:?}: {message}")]
    Malformed { path: String, message: String },
}

/// An ordered sequence of keys locating a value within nested JSON objects.
///
/// `["a", "b", "c"]` addresses `document["a"]["b"]["c"]`.
///
/// # Key Path Syntax
///
/// - Keys are separated by `.`
/// - `\.` is a literal dot and `\\` a literal backslash inside a key
/// - Empty keys are ignored (normalizes `a..b` and a trailing `.`)
///
/// Keys that cannot be spelled this way (the empty key, for instance) can
/// still be addressed by building the path from its components.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyPath {
    pub components: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted key path string.
    ///
    /// ```rust
    /// use jsonnest_core::KeyPath;
    ///
    /// let path = KeyPath::parse("server.tls.cert").unwrap();
    /// assert_eq!(path.len(), 3);
    ///
    /// let dotted = KeyPath::parse(r"hosts.example\.com").unwrap();
    /// assert_eq!(dotted.components, vec!["hosts", "example.com"]);
    /// ```
    pub fn parse(path: &str) -> Result<Self, KeyPathError> {
        lazy_static! {
            static ref WELL_FORMED: Regex = Regex::new(r"^(?:[^\\]|\\[\\.])*$").unwrap();
            static ref COMPONENT: Regex = Regex::new(r"(?:[^.\\]|\\[\\.])+").unwrap();
            static ref ESCAPE: Regex = Regex::new(r"\\([\\.])").unwrap();
        }

        if !WELL_FORMED.is_match(path) {
            return Err(KeyPathError::Malformed {
                path: path.to_string(),
                message: r"a backslash may only escape '.' or '\'".to_string(),
            });
        }

        Ok(KeyPath {
            components: COMPONENT
                .find_iter(path)
                .map(|m| ESCAPE.replace_all(m.as_str(), "$1").into_owned())
                .collect(),
        })
    }

    /// Create a key path from raw keys. No escaping is applied.
    pub fn from_components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyPath {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.components.iter()
    }

    /// Split into the parent keys and the final key.
    ///
    /// Fails with [`KeyPathError::Empty`] when there is no final key.
    pub fn split_last(&self) -> Result<(&[String], &str), KeyPathError> {
        match self.components.split_last() {
            Some((last, parents)) => Ok((parents, last.as_str())),
            None => Err(KeyPathError::Empty),
        }
    }

    /// The first `len` keys as a new path.
    #[must_use]
    pub fn prefix(&self, len: usize) -> KeyPath {
        KeyPath {
            components: self.components[..len.min(self.components.len())].to_vec(),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escaped: Vec<String> = self
            .components
            .iter()
            .map(|c| c.replace('\\', r"\\").replace('.', r"\."))
            .collect();
        write!(f, "{}", escaped.join("."))
    }
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPath::parse(s)
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(components: Vec<String>) -> Self {
        KeyPath { components }
    }
}

impl From<&[&str]> for KeyPath {
    fn from(components: &[&str]) -> Self {
        KeyPath::from_components(components.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(components: [&str; N]) -> Self {
        KeyPath::from_components(components)
    }
}

impl std::ops::Index<usize> for KeyPath {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.components[i]
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl Serialize for KeyPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D>(deserializer: D) -> Result<KeyPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        KeyPath::parse(&s).map_err(D::Error::custom)
    }
}

/// Macro for creating key paths from string literals.
///
/// # Example
///
/// ```rust
/// use jsonnest_core::key_path;
///
/// let p = key_path!("users.alice.email");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! key_path {
    ($s:expr) => {
        $crate::KeyPath::parse($s).expect("invalid key path literal")
    };
}
