//! jsonnest: nested key access and object serialization on top of JSON files.
//!
//! A [`JsonFile`] keeps one JSON object on disk in sync with an in-memory copy
//! and addresses values inside it with dotted [`KeyPath`]s. Every mutation is
//! written through to the file before it returns. A [`JsonSerializer`] turns
//! serde types into JSON text or files and back.
//!
//! ```rust
//! use jsonnest::{key_path, JsonFile, JsonSerializer};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Limits {
//!     max_connections: u32,
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut settings = JsonFile::open(dir.path().join("settings.json")).unwrap();
//!
//! settings.set(&key_path!("db.primary.host"), "10.0.0.1").unwrap();
//! settings
//!     .set_object(&key_path!("db.limits"), &Limits { max_connections: 64 })
//!     .unwrap();
//!
//! let limits: Limits = settings.get_object(&key_path!("db.limits")).unwrap();
//! assert_eq!(limits.max_connections, 64);
//!
//! let text = JsonSerializer::default().serialize(&limits).unwrap();
//! assert_eq!(text, r#"{"max_connections":64}"#);
//! ```

pub use jsonnest_core::{
    document, json, key_path, Document, Encoding, Error, KeyPath, KeyPathError, Map, Result,
    Value,
};
pub use jsonnest_file::{JsonFile, JsonFileOptions};
pub use jsonnest_serializer::{FromMapping, JsonSerializer, SerializerOptions, ToMapping};
