//! Core types for jsonnest.
//!
//! This crate holds everything that does not touch the filesystem:
//! - `KeyPath`: dotted paths into nested JSON objects
//! - `document`: the get/set/remove traversals and top-level selection
//! - `Encoding`: text encodings for document files
//! - `Error`: the error type shared by every jsonnest crate

pub mod document;
pub mod encoding;
pub mod error;
pub mod path;

pub use document::{
    contains_path, get_path, remove_path, select, select_range, set_path, Document,
};
pub use encoding::Encoding;
pub use error::{json_type_name, Error, Result};
pub use path::{KeyPath, KeyPathError};

pub use serde_json::{json, Map, Value};
