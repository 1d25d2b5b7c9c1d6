// guard.rs — Keeps every subpath inside its directory root.
//
// Resolution is purely lexical: `.` and `..` are folded without touching the
// filesystem, so the check works for paths that do not exist yet and does not
// follow symlinks. A subpath is accepted when the folded result equals the
// root or lies below it. Absolute subpaths replace the root on join and are
// rejected unless they happen to point inside it.

use std::path::{Component, Path, PathBuf};

use crate::error::{FixtureError, Result};

/// Resolve `subpath` against `root`, rejecting anything that escapes it.
pub fn resolve(root: &Path, subpath: impl AsRef<Path>) -> Result<PathBuf> {
    let subpath = subpath.as_ref();
    let root = normalize(root);
    let resolved = normalize(&root.join(subpath));

    if !resolved.starts_with(&root) {
        return Err(FixtureError::PathEscape {
            subpath: subpath.to_string_lossy().to_string(),
            root,
        });
    }

    Ok(resolved)
}

/// Fold `.` and `..` components. `..` never climbs above a root or prefix.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
