pub mod options;
mod persist;
pub mod store;

pub use jsonnest_core::{key_path, Document, Encoding, Error, KeyPath, KeyPathError, Result};

pub use options::JsonFileOptions;
pub use store::JsonFile;
