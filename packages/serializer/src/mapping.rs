//! Conversions between Rust objects and JSON object mappings.

use std::any::type_name;

use serde::de::DeserializeOwned;
use serde::Serialize;

use jsonnest_core::{json_type_name, Document, Error, Result, Value};

/// Convert an object to the mapping of its field names to values.
///
/// This trait is automatically implemented for every `Serialize` type, so
/// deriving `Serialize` is how a type opts in. Types whose serialized form is
/// not a JSON object (numbers, strings, sequences, tuple structs) fail with
/// [`Error::NotSerializable`].
///
/// # Example
///
/// ```rust
/// use jsonnest_serializer::ToMapping;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let mapping = Point { x: 1, y: 2 }.to_mapping().unwrap();
/// assert_eq!(mapping["x"], 1);
/// assert!(42_i32.to_mapping().is_err());
/// ```
pub trait ToMapping {
    fn to_mapping(&self) -> Result<Document>;
}

impl<T: Serialize + ?Sized> ToMapping for T {
    fn to_mapping(&self) -> Result<Document> {
        let value = serde_json::to_value(self).map_err(|e| Error::Serialize {
            message: e.to_string(),
        })?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(Error::NotSerializable {
                type_name: type_name::<T>(),
                message: format!("serializes to {} instead of an object", json_type_name(&other)),
            }),
        }
    }
}

/// Build an object from a mapping of field names to values.
///
/// Automatically implemented for every `DeserializeOwned` type.
pub trait FromMapping: Sized {
    fn from_mapping(mapping: Document) -> Result<Self>;
}

impl<T: DeserializeOwned> FromMapping for T {
    fn from_mapping(mapping: Document) -> Result<Self> {
        serde_json::from_value(Value::Object(mapping)).map_err(|e| Error::Deserialize {
            message: format!("{} from mapping: {}", type_name::<T>(), e),
        })
    }
}
