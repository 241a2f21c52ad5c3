//! Object <-> JSON text and file conversion.

use std::any::type_name;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use jsonnest_core::document::{parse_document, render_document};
use jsonnest_core::{json_type_name, Document, Encoding, Error, Result, Value};

use crate::mapping::{FromMapping, ToMapping};

/// Settings for a [`JsonSerializer`].
///
/// Deserializable with defaults for every missing field, so it can be
/// embedded in an application's own JSON configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Spaces per indentation level. `None` renders compact JSON.
    pub indent: Option<usize>,
    /// Encoding used by the file methods.
    pub encoding: Encoding,
    /// When set, only these top-level fields are serialized.
    pub include_fields: Option<Vec<String>>,
    /// Top-level fields dropped after `include_fields` is applied.
    pub exclude_fields: Vec<String>,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent: None,
            encoding: Encoding::Utf8,
            include_fields: None,
            exclude_fields: Vec::new(),
        }
    }
}

impl SerializerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn include_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn exclude_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Serializes objects to JSON text or files and back.
///
/// # Example
///
/// ```rust
/// use jsonnest_serializer::{JsonSerializer, SerializerOptions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// let serializer = JsonSerializer::new(SerializerOptions::new());
/// let text = serializer.serialize(&User { name: "Alice".into(), age: 30 }).unwrap();
/// assert_eq!(text, r#"{"name":"Alice","age":30}"#);
///
/// let user: User = serializer.deserialize(&text).unwrap();
/// assert_eq!(user.age, 30);
/// ```
#[derive(Clone, Debug, Default)]
pub struct JsonSerializer {
    options: SerializerOptions,
}

impl JsonSerializer {
    pub fn new(options: SerializerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    /// Whether `object` has a field mapping at all.
    pub fn is_serializable<T: ToMapping + ?Sized>(&self, object: &T) -> bool {
        object.to_mapping().is_ok()
    }

    /// The object's field mapping with the field filters applied.
    pub fn to_mapping<T: ToMapping + ?Sized>(&self, object: &T) -> Result<Document> {
        let mut mapping = object.to_mapping()?;

        if let Some(include) = &self.options.include_fields {
            mapping.retain(|field, _| include.iter().any(|i| i == field));
        }
        for field in &self.options.exclude_fields {
            mapping.shift_remove(field.as_str());
        }

        Ok(mapping)
    }

    pub fn serialize<T: ToMapping + ?Sized>(&self, object: &T) -> Result<String> {
        let mapping = self.to_mapping(object)?;
        render_document(&mapping, self.options.indent, self.options.encoding)
    }

    pub fn deserialize<T: FromMapping>(&self, text: &str) -> Result<T> {
        let value: Value = serde_json::from_str(text).map_err(|e| Error::Deserialize {
            message: e.to_string(),
        })?;

        match value {
            Value::Object(mapping) => T::from_mapping(mapping),
            other => Err(Error::NotSerializable {
                type_name: type_name::<T>(),
                message: format!("JSON text holds {} instead of an object", json_type_name(&other)),
            }),
        }
    }

    /// Write the object's JSON to `path`, replacing any existing file.
    pub fn serialize_to_file<T, P>(&self, object: &T, path: P) -> Result<()>
    where
        T: ToMapping + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = self.serialize(object)?;
        let bytes = self.options.encoding.encode(&text)?;

        log::debug!("Writing {}...", path.display());
        fs::write(path, bytes).map_err(|e| Error::io(path, e))
    }

    /// Load an object from the JSON file at `path`.
    pub fn deserialize_from_file<T, P>(&self, path: P) -> Result<T>
    where
        T: FromMapping,
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        log::debug!("Reading {}...", path.display());
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let text = self.options.encoding.decode(&bytes)?;

        let mapping = parse_document(&text).map_err(|message| Error::malformed(path, message))?;
        T::from_mapping(mapping)
    }
}
