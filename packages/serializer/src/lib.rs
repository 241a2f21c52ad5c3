//! Object serialization for jsonnest.
//!
//! This layer converts Rust objects to and from JSON object mappings. It adds:
//! - `ToMapping` / `FromMapping`: the field-mapping view of any serde type
//! - `JsonSerializer`: text and file conversion with field filters
//!
//! # Example
//!
//! ```rust,ignore
//! use jsonnest_serializer::{JsonSerializer, SerializerOptions};
//!
//! let serializer = JsonSerializer::new(SerializerOptions::new().indent(4));
//! serializer.serialize_to_file(&settings, "settings.json")?;
//! let settings: Settings = serializer.deserialize_from_file("settings.json")?;
//! ```

mod mapping;
mod serializer;

pub use mapping::{FromMapping, ToMapping};
pub use serializer::{JsonSerializer, SerializerOptions};

// Re-export core types for convenience
pub use jsonnest_core::{Document, Encoding, Error, Result};
