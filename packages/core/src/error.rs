//! Error types shared by every jsonnest crate.

use std::path::PathBuf;

use crate::encoding::Encoding;
use crate::path::{KeyPath, KeyPathError};

/// Errors raised while reading, traversing or persisting a JSON document.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The file contents are not a JSON object.
    #[error("malformed document at {}: {message}", .path.display())]
    MalformedDocument { path: PathBuf, message: String },

    /// A read traversal ran past the end of the existing structure.
    #[error("key not found: {key_path}")]
    KeyNotFound { key_path: KeyPath },

    /// A write traversal met a non-object value where an object is required.
    #[error("path conflict at {key_path}: expected an object, found {found}")]
    PathConflict {
        key_path: KeyPath,
        found: &'static str,
    },

    /// Creating, reading, writing or renaming the backing file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    InvalidKeyPath(#[from] KeyPathError),

    #[error("unknown text encoding: {label:?}")]
    UnknownEncoding { label: String },

    /// Text could not be decoded from, or encoded to, the configured encoding.
    #[error("{encoding} error: {message}")]
    Encoding { encoding: Encoding, message: String },

    /// The object has no field mapping (its serialized form is not an object).
    #[error("{type_name} is not serializable as a mapping: {message}")]
    NotSerializable {
        type_name: &'static str,
        message: String,
    },

    #[error("an error occurred while serializing a value: {message}")]
    Serialize { message: String },

    #[error("an error occurred while deserializing a value: {message}")]
    Deserialize { message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn key_not_found(key_path: &KeyPath) -> Self {
        Error::KeyNotFound {
            key_path: key_path.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The JSON type name of a value, as used in error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn key_not_found_display() {
        let e = Error::key_not_found(&KeyPath::from(["x", "y"]));
        assert_eq!(format!("{}", e), "key not found: x.y");
    }

    #[test]
    fn path_conflict_display() {
        let e = Error::PathConflict {
            key_path: KeyPath::from(["a", "b"]),
            found: "number",
        };
        let display = format!("{}", e);
        assert!(display.contains("a.b"));
        assert!(display.contains("found number"));
    }

    #[test]
    fn malformed_display() {
        let e = Error::malformed("/tmp/doc.json", "expected value at line 1 column 1");
        let display = format!("{}", e);
        assert!(display.contains("/tmp/doc.json"));
        assert!(display.contains("expected value"));
    }

    #[test]
    fn io_error_source() {
        let e = Error::io(
            "/nope",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(StdError::source(&e).is_some());
        assert!(format!("{}", e).contains("denied"));
    }

    #[test]
    fn key_path_error_conversion() {
        let e: Error = KeyPathError::Empty.into();
        assert!(matches!(e, Error::InvalidKeyPath(KeyPathError::Empty)));
        assert_eq!(
            format!("{}", e),
            "key path must contain at least one key"
        );
    }

    #[test]
    fn encoding_error_display() {
        let e = Error::Encoding {
            encoding: Encoding::Ascii,
            message: "character 'é' is not representable".to_string(),
        };
        assert!(format!("{}", e).starts_with("ascii error"));
    }

    #[test]
    fn type_names() {
        assert_eq!(json_type_name(&serde_json::json!(1)), "number");
        assert_eq!(json_type_name(&serde_json::json!([])), "array");
        assert_eq!(json_type_name(&serde_json::json!(null)), "null");
    }
}
