// reader.rs — Reconstructs Trees and flat listings from real directories.
//
// Entries are visited in name order, so both the Tree and the listing come
// out sorted at every level. Glob patterns see paths relative to the read
// subpath, never to the handle root. Dangling symlinks are skipped by both.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fixture_tree::{Encoding, FileContent, GlobFilter, GlobSpec, Tree, TreeEntry};
use tracing::debug;

use crate::error::{io_at, FixtureError, Result};
use crate::guard;

/// Read the directory at `root/subpath` into a Tree.
///
/// Fails with [`FixtureError::NotFound`] when the target is missing and
/// [`FixtureError::NotADirectory`] when it is a file.
pub fn read_tree(root: &Path, subpath: Option<&str>, filter: &GlobFilter) -> Result<Tree> {
    let target = guard::resolve(root, subpath.unwrap_or(""))?;
    match fs::metadata(&target) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(FixtureError::NotADirectory { path: target }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FixtureError::NotFound { path: target })
        }
        Err(e) => return Err(io_at(&target)(e)),
    }

    debug!(target = %target.display(), "reading tree");
    read_level(&target, "", filter)
}

fn read_level(dir: &Path, prefix: &str, filter: &GlobFilter) -> Result<Tree> {
    let mut tree = Tree::new();

    for (name, path, is_dir) in sorted_entries(dir)? {
        let rel = format!("{prefix}{name}");
        if is_dir {
            if filter.prunes_dir(&rel) {
                continue;
            }
            let sub = read_level(&path, &format!("{rel}/"), filter)?;
            if !sub.is_empty() || filter.includes_dir(&rel) {
                tree.insert(name, TreeEntry::Dir(sub));
            }
        } else if filter.keeps_file(&rel) {
            let bytes = fs::read(&path).map_err(io_at(&path))?;
            tree.insert(name, TreeEntry::File(FileContent::from_bytes(bytes)));
        }
    }

    Ok(tree)
}

/// Flat, sorted, depth-first listing of everything under `root/subpath`.
///
/// Directory entries end with `/` unless `spec.directories` is false.
/// Returns `None` when the target is missing or is not a directory.
pub fn list_dir(root: &Path, subpath: Option<&str>, spec: &GlobSpec) -> Result<Option<Vec<String>>> {
    let target = guard::resolve(root, subpath.unwrap_or(""))?;
    if !target.is_dir() {
        return Ok(None);
    }

    let filter = spec.compile()?;
    let mut out = Vec::new();
    list_level(&target, "", &filter, spec.directories, &mut out)?;
    Ok(Some(out))
}

fn list_level(
    dir: &Path,
    prefix: &str,
    filter: &GlobFilter,
    directories: bool,
    out: &mut Vec<String>,
) -> Result<()> {
    for (name, path, is_dir) in sorted_entries(dir)? {
        let rel = format!("{prefix}{name}");
        if is_dir {
            if filter.prunes_dir(&rel) {
                continue;
            }
            let mark = out.len();
            if directories {
                out.push(format!("{rel}/"));
            }
            let before = out.len();
            list_level(&path, &format!("{rel}/"), filter, directories, out)?;
            // Drop the directory entry when nothing below it survived and the
            // directory itself was not selected.
            if out.len() == before && !filter.includes_dir(&rel) {
                out.truncate(mark);
            }
        } else if filter.keeps_file(&rel) {
            out.push(rel);
        }
    }
    Ok(())
}

/// Raw bytes of a single file, `None` if it does not exist.
///
/// Reading a directory is an error, not `None`.
pub fn read_binary(root: &Path, subpath: &str) -> Result<Option<Vec<u8>>> {
    let path = guard::resolve(root, subpath)?;
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => Err(FixtureError::IsADirectory { path }),
        Ok(_) => fs::read(&path).map(Some).map_err(io_at(&path)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_at(&path)(e)),
    }
}

/// A single file decoded with `encoding`, `None` if it does not exist.
pub fn read_text(root: &Path, subpath: &str, encoding: Encoding) -> Result<Option<String>> {
    match read_binary(root, subpath)? {
        Some(bytes) => Ok(Some(encoding.decode(&bytes)?)),
        None => Ok(None),
    }
}

/// Directory entries as `(name, path, is_dir)`, sorted by name.
///
/// Symlinks are classified by what they point at. Dangling symlinks have no
/// content to read and are skipped.
pub(crate) fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf, bool)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_at(dir))? {
        let entry = entry.map_err(io_at(dir))?;
        let path = entry.path();
        let is_dir = match fs::metadata(&path) {
            Ok(meta) => meta.is_dir(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "skipping dangling symlink");
                continue;
            }
            Err(e) => return Err(io_at(&path)(e)),
        };
        entries.push((entry.file_name().to_string_lossy().to_string(), path, is_dir));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
