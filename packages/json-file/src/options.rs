use serde::{Deserialize, Serialize};

use jsonnest_core::Encoding;

/// How a [`JsonFile`](crate::JsonFile) reads and writes its backing file.
///
/// ```rust
/// use jsonnest_file::{Encoding, JsonFileOptions};
///
/// let options = JsonFileOptions::new()
///     .encoding(Encoding::Utf16Le)
///     .indent(2)
///     .create_parents(true);
/// assert!(options.atomic);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFileOptions {
    pub encoding: Encoding,
    /// Spaces per indentation level in the written file.
    pub indent: usize,
    /// Write to a temporary file and rename it over the target, so a crash
    /// mid-write never leaves a truncated document behind.
    pub atomic: bool,
    /// Create missing parent directories when creating the file.
    pub create_parents: bool,
}

impl Default for JsonFileOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            indent: 4,
            atomic: true,
            create_parents: false,
        }
    }
}

impl JsonFileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    #[must_use]
    pub fn create_parents(mut self, create_parents: bool) -> Self {
        self.create_parents = create_parents;
        self
    }
}
