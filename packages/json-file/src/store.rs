use std::any::type_name;
use std::ops::RangeBounds;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use jsonnest_core::{document, Document, Encoding, Error, KeyPath, Result, Value};
use jsonnest_serializer::{FromMapping, ToMapping};

use crate::options::JsonFileOptions;
use crate::persist;

/// A JSON object stored in a file, addressed by nested key paths.
///
/// The in-memory document mirrors the file: it is loaded when the store is
/// opened, and every mutation writes the whole document back before reloading
/// it from disk. Nothing is cached across instances, so several `JsonFile`s
/// may point at the same path; the last write wins.
///
/// Reads, writes and removals disagree about missing structure on purpose:
/// [`get`](Self::get) fails on it, [`set`](Self::set) creates it and
/// [`remove`](Self::remove) ignores it.
///
/// # Example
///
/// ```rust
/// use jsonnest_file::{key_path, JsonFile};
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut file = JsonFile::open(dir.path().join("settings.json")).unwrap();
///
/// file.set(&key_path!("server.port"), 8080).unwrap();
/// assert_eq!(file.get(&key_path!("server.port")).unwrap(), 8080);
///
/// file.remove(&key_path!("server.port")).unwrap();
/// assert!(file.get(&key_path!("server.port")).is_err());
/// ```
#[derive(Debug)]
pub struct JsonFile {
    path: PathBuf,
    options: JsonFileOptions,
    document: Document,
}

impl JsonFile {
    /// Open the document at `path` with default options, creating the file as
    /// `{}` if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<JsonFile> {
        JsonFile::open_with(path, JsonFileOptions::default())
    }

    pub fn open_with(path: impl Into<PathBuf>, options: JsonFileOptions) -> Result<JsonFile> {
        let path = path.into();
        persist::create_if_missing(&path, &options)?;
        let document = persist::read_document(&path, options.encoding)?;

        Ok(JsonFile {
            path,
            options,
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encoding(&self) -> Encoding {
        self.options.encoding
    }

    pub fn options(&self) -> &JsonFileOptions {
        &self.options
    }

    /// The in-memory copy of the document, as of the last load.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Parse the file as it is on disk right now.
    ///
    /// This does not update the in-memory document; see [`reload`](Self::reload).
    pub fn read(&self) -> Result<Document> {
        persist::read_document(&self.path, self.options.encoding)
    }

    /// Replace the whole file with `document`, then reload it.
    ///
    /// If the write fails neither the file nor the in-memory document changes.
    /// If the write succeeds but the reload fails, the in-memory document
    /// holds `document`, matching what was written.
    pub fn write(&mut self, document: &Document) -> Result<()> {
        persist::write_document(&self.path, document, &self.options)?;
        self.document = document.clone();
        self.reload()
    }

    /// Reload the in-memory document from disk, picking up writes made by
    /// other instances.
    pub fn reload(&mut self) -> Result<()> {
        self.document = self.read()?;
        Ok(())
    }

    /// The value at `key_path`.
    ///
    /// Fails with [`Error::KeyNotFound`] if any key along the path is missing
    /// or an intermediate value is not an object.
    pub fn get(&self, key_path: &KeyPath) -> Result<&Value> {
        document::get_path(&self.document, key_path)
    }

    /// The value at `key_path`, deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key_path: &KeyPath) -> Result<T> {
        let value = self.get(key_path)?;
        T::deserialize(value).map_err(|e| Error::Deserialize {
            message: format!("{} at {}: {}", type_name::<T>(), key_path, e),
        })
    }

    /// The object stored at `key_path` by [`set_object`](Self::set_object).
    pub fn get_object<T: FromMapping>(&self, key_path: &KeyPath) -> Result<T> {
        match self.get(key_path)? {
            Value::Object(mapping) => T::from_mapping(mapping.clone()),
            other => Err(Error::NotSerializable {
                type_name: type_name::<T>(),
                message: format!(
                    "value at {} is {}, not an object",
                    key_path,
                    jsonnest_core::json_type_name(other)
                ),
            }),
        }
    }

    pub fn contains(&self, key_path: &KeyPath) -> bool {
        document::contains_path(&self.document, key_path)
    }

    /// Set the value at `key_path`, creating missing intermediate objects, and
    /// persist the document.
    ///
    /// Fails with [`Error::PathConflict`] rather than replace an existing
    /// non-object value with an object. On failure the file is untouched.
    pub fn set(&mut self, key_path: &KeyPath, value: impl Into<Value>) -> Result<()> {
        let mut updated = self.document.clone();
        document::set_path(&mut updated, key_path, value.into())?;
        self.write(&updated)
    }

    /// Serialize `data` and store it at `key_path`.
    pub fn set_as<T: Serialize + ?Sized>(&mut self, key_path: &KeyPath, data: &T) -> Result<()> {
        let value = serde_json::to_value(data).map_err(|e| Error::Serialize {
            message: format!("{} for {}: {}", type_name::<T>(), key_path, e),
        })?;
        self.set(key_path, value)
    }

    /// Store the field mapping of `object` at `key_path`.
    pub fn set_object<T: ToMapping + ?Sized>(
        &mut self,
        key_path: &KeyPath,
        object: &T,
    ) -> Result<()> {
        let mapping = object.to_mapping()?;
        self.set(key_path, Value::Object(mapping))
    }

    /// Remove the value at `key_path` and persist the document.
    ///
    /// Returns the removed value. When the path does not resolve this is a
    /// no-op returning `None`, and the file is not rewritten.
    pub fn remove(&mut self, key_path: &KeyPath) -> Result<Option<Value>> {
        let mut updated = self.document.clone();
        let removed = document::remove_path(&mut updated, key_path)?;
        if removed.is_none() {
            log::trace!("{} not present in {}", key_path, self.path.display());
            return Ok(None);
        }

        self.write(&updated)?;
        Ok(removed)
    }

    /// Top-level keys whose values satisfy `predicate`, in document order.
    pub fn select<F>(&self, predicate: F) -> Vec<String>
    where
        F: FnMut(&Value) -> bool,
    {
        document::select(&self.document, predicate)
    }

    /// Top-level keys holding an integral number within `range`.
    pub fn select_range<R: RangeBounds<i64>>(&self, range: R) -> Vec<String> {
        document::select_range(&self.document, range)
    }
}
