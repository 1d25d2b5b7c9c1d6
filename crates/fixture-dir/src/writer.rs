// writer.rs — Applies a Tree onto a real directory.
//
// A write is a sparse patch: every key in the tree is reconciled against the
// disk, keys that are not mentioned are left alone.
//   - Dir     → ensure a directory exists, then recurse
//   - File    → create or overwrite, creating parent directories
//   - Remove  → delete recursively if present, no-op if absent
//
// Entry names must be single path segments, and every path is resolved
// through the guard. Both checks fail before anything is modified.

use std::fs;
use std::io;
use std::path::Path;

use fixture_tree::{Encoding, Tree, TreeEntry};
use tracing::debug;

use crate::error::{io_at, FixtureError, Result};
use crate::guard;

/// Write `tree` into `root`, or into `root/subpath` when given.
pub fn write_tree(root: &Path, tree: &Tree, subpath: Option<&str>) -> Result<()> {
    let target = guard::resolve(root, subpath.unwrap_or(""))?;
    check_names(tree)?;
    ensure_dir(&target)?;
    debug!(target = %target.display(), entries = tree.len(), "writing tree");
    apply(&target, tree)
}

/// Every name must be a single path segment. Checked for the whole tree
/// before anything on disk is touched.
fn check_names(tree: &Tree) -> Result<()> {
    for (name, entry) in tree.iter() {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains(std::path::MAIN_SEPARATOR)
        {
            return Err(FixtureError::InvalidEntryName {
                name: name.to_string(),
            });
        }
        if let TreeEntry::Dir(sub) = entry {
            check_names(sub)?;
        }
    }
    Ok(())
}

fn apply(dir: &Path, tree: &Tree) -> Result<()> {
    for (name, entry) in tree.iter() {
        let path = guard::resolve(dir, name)?;
        match entry {
            TreeEntry::Dir(sub) => {
                ensure_dir(&path)?;
                apply(&path, sub)?;
            }
            TreeEntry::File(content) => write_file(&path, content.as_bytes())?,
            TreeEntry::Remove => remove_entry(&path)?,
        }
    }
    Ok(())
}

/// Write raw bytes to a single file, creating parent directories.
pub fn write_bytes(root: &Path, subpath: &str, bytes: &[u8]) -> Result<()> {
    let path = guard::resolve(root, subpath)?;
    write_file(&path, bytes)
}

/// Write `text` serialized with `encoding` to a single file.
pub fn write_text(root: &Path, subpath: &str, text: &str, encoding: Encoding) -> Result<()> {
    let bytes = encoding.encode(text)?;
    write_bytes(root, subpath, &bytes)
}

/// Create a directory (and missing parents). Succeeds if it already exists
/// as a directory, fails if something else is there.
pub fn make_dir(root: &Path, subpath: &str) -> Result<()> {
    let path = guard::resolve(root, subpath)?;
    ensure_dir(&path)
}

/// Recursively copy the content of an external directory into `root/to`.
///
/// Existing entries are merged: same-named files are overwritten, other
/// entries are kept.
pub fn copy_dir(root: &Path, from: &Path, to: Option<&str>) -> Result<()> {
    let target = guard::resolve(root, to.unwrap_or(""))?;
    match fs::metadata(from) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(FixtureError::NotADirectory {
                path: from.to_path_buf(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FixtureError::NotFound {
                path: from.to_path_buf(),
            })
        }
        Err(e) => return Err(io_at(from)(e)),
    }
    ensure_dir(&target)?;
    debug!(from = %from.display(), to = %target.display(), "copying directory");
    copy_recursive(from, &target)
}

fn copy_recursive(src: &Path, dst: &Path) -> Result<()> {
    let entries = fs::read_dir(src).map_err(io_at(src))?;

    for entry in entries {
        let entry = entry.map_err(io_at(src))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            ensure_dir(&dst_path)?;
            copy_recursive(&src_path, &dst_path)?;
        } else {
            if dst_path.is_dir() {
                return Err(FixtureError::IsADirectory { path: dst_path });
            }
            fs::copy(&src_path, &dst_path).map_err(io_at(&dst_path))?;
        }
    }

    Ok(())
}

/// Make sure `path` is a directory, creating it (and parents) if absent.
pub(crate) fn ensure_dir(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FixtureError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(|source| {
                // A file somewhere up the chain blocks creation.
                if source.kind() == io::ErrorKind::AlreadyExists || has_file_ancestor(path) {
                    FixtureError::NotADirectory {
                        path: path.to_path_buf(),
                    }
                } else {
                    FixtureError::Io {
                        path: path.to_path_buf(),
                        source,
                    }
                }
            })
        }
        Err(e) => Err(io_at(path)(e)),
    }
}

fn has_file_ancestor(path: &Path) -> bool {
    path.ancestors()
        .skip(1)
        .any(|ancestor| ancestor.is_file())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if path.is_dir() {
        return Err(FixtureError::IsADirectory {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, bytes).map_err(io_at(path))
}

fn remove_entry(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_at(path)(e)),
    };

    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(io_at(path))
    } else {
        fs::remove_file(path).map_err(io_at(path))
    }
}
