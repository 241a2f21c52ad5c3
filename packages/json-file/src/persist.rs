//! Reading and writing whole documents.
//!
//! Every call opens the file, transfers the full contents and closes it again
//! before returning.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jsonnest_core::document::{parse_document, render_document};
use jsonnest_core::{Document, Encoding, Error, Result};

use crate::options::JsonFileOptions;

const MAX_SYMLINK_HOPS: usize = 40;

pub(crate) fn read_document(path: &Path, encoding: Encoding) -> Result<Document> {
    log::debug!("Reading {}...", path.display());

    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let text = encoding.decode(&bytes)?;
    parse_document(&text).map_err(|message| Error::malformed(path, message))
}

pub(crate) fn write_document(
    path: &Path,
    document: &Document,
    options: &JsonFileOptions,
) -> Result<()> {
    let text = render_document(document, Some(options.indent), options.encoding)?;
    let bytes = options.encoding.encode(&text)?;

    log::debug!("Writing {}...", path.display());

    if options.atomic {
        replace_atomically(path, &bytes)
    } else {
        fs::write(path, &bytes).map_err(|e| Error::io(path, e))
    }
}

/// Create the file holding an empty document unless it already exists.
///
/// Returns whether the file was created.
pub(crate) fn create_if_missing(path: &Path, options: &JsonFileOptions) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if options.create_parents {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    let text = render_document(&Document::new(), Some(options.indent), options.encoding)?;
    let bytes = options.encoding.encode(&text)?;

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        // Another instance created it first.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(Error::io(path, e)),
    };

    log::debug!("Creating {}...", path.display());
    file.write_all(&bytes).map_err(|e| Error::io(path, e))?;
    file.sync_all().map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Follow symbolic links from `path` to the file they name.
///
/// The target need not exist, so a dangling link still resolves to where the
/// file would be created.
fn resolve_symlinks(path: &Path) -> Result<PathBuf> {
    let mut target = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        match fs::symlink_metadata(&target) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                let link = fs::read_link(&target).map_err(|e| Error::io(&target, e))?;
                target = match target.parent() {
                    Some(parent) => parent.join(link),
                    None => link,
                };
            }
            _ => return Ok(target),
        }
    }

    Err(Error::io(
        path,
        io::Error::new(io::ErrorKind::Other, "too many levels of symbolic links"),
    ))
}

fn replace_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    // Renaming over a link would replace the link, not the file behind it.
    let target = resolve_symlinks(path)?;
    let path = target.as_path();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    temp.write_all(bytes).map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(temp.path(), e))?;

    // Temporary files are created private; keep the target's permissions.
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::io(temp.path(), e))?;
    }

    temp.persist(path).map_err(|e| {
        let temp_path = e.file.path().to_path_buf();
        if let Err(cleanup) = e.file.close() {
            log::warn!(
                "Failed to remove temporary file {}: {}",
                temp_path.display(),
                cleanup
            );
        }
        Error::io(path, e.error)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let document = doc(json!({"a": {"b": [1, 2]}, "c": null}));

        for atomic in [true, false] {
            let options = JsonFileOptions::new().atomic(atomic);
            write_document(&path, &document, &options).unwrap();
            assert_eq!(read_document(&path, Encoding::Utf8).unwrap(), document);
        }
    }

    #[test]
    fn written_text_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        write_document(&path, &doc(json!({"k": 1})), &JsonFileOptions::new()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n    \"k\": 1\n}");
    }

    #[test]
    fn atomic_write_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        write_document(&path, &doc(json!({"k": 1})), &JsonFileOptions::new()).unwrap();
        write_document(&path, &doc(json!({"k": 2})), &JsonFileOptions::new()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_document(&path, &doc(json!({"k": 1})), &JsonFileOptions::new()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_goes_through_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        let real = dir.path().join("data").join("real.json");
        let link = dir.path().join("link.json");
        fs::write(&real, "{}").unwrap();
        symlink(Path::new("data").join("real.json"), &link).unwrap();

        write_document(&link, &doc(json!({"a": 1})), &JsonFileOptions::new()).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "{\n    \"a\": 1\n}");
        assert_eq!(read_document(&link, Encoding::Utf8).unwrap(), doc(json!({"a": 1})));
        assert_eq!(fs::read_dir(dir.path().join("data")).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loops_are_reported() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        symlink(&b, &a).unwrap();
        symlink(&a, &b).unwrap();

        assert!(matches!(
            write_document(&a, &doc(json!({})), &JsonFileOptions::new()),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn read_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            read_document(&path, Encoding::Utf8),
            Err(Error::MalformedDocument { .. })
        ));
    }

    #[test]
    fn create_if_missing_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let options = JsonFileOptions::new();

        assert!(create_if_missing(&path, &options).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        fs::write(&path, "{\"kept\": true}").unwrap();
        assert!(!create_if_missing(&path, &options).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"kept\": true}");
    }

    #[test]
    fn create_parents_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("doc.json");

        assert!(matches!(
            create_if_missing(&path, &JsonFileOptions::new()),
            Err(Error::Io { .. })
        ));
        assert!(create_if_missing(&path, &JsonFileOptions::new().create_parents(true)).unwrap());
        assert!(path.exists());
    }

    #[test]
    fn utf16_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let options = JsonFileOptions::new().encoding(Encoding::Utf16Le);
        let document = doc(json!({"名前": "値"}));

        write_document(&path, &document, &options).unwrap();
        assert_eq!(fs::read(&path).unwrap()[..2], [b'{', 0]);
        assert_eq!(read_document(&path, Encoding::Utf16Le).unwrap(), document);
        assert!(read_document(&path, Encoding::Utf8).is_err());
    }
}
