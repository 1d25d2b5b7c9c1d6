// tracker.rs — Snapshot-based change tracking for a directory.
//
// The tracker owns the last observed Tree of its directory. Each call to
// `changes` reads the directory again, diffs the fresh snapshot against the
// stored one, and replaces the stored snapshot wholesale. A missing root
// reads as an empty tree, so removing the whole directory reports every
// entry as removed instead of failing.

use std::fs;
use std::io;
use std::path::Path;

use fixture_tree::{diff_trees, ChangeOp, ChangeSet, GlobFilter, Tree};
use tracing::debug;

use crate::error::{io_at, Result};
use crate::guard;
use crate::reader;

/// Tracks changes to one directory between successive calls.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    snapshot: Tree,
}

impl ChangeTracker {
    /// Start tracking `root`, taking its current content as the baseline.
    pub fn new(root: &Path) -> Result<Self> {
        Ok(Self {
            snapshot: snapshot(root)?,
        })
    }

    /// A tracker whose baseline is the empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The last observed content.
    pub fn snapshot(&self) -> &Tree {
        &self.snapshot
    }

    /// Changes since the previous call (or since construction).
    pub fn changes(&mut self, root: &Path) -> Result<ChangeSet> {
        let current = snapshot(root)?;
        let changes = diff_trees(&self.snapshot, &current);
        debug!(root = %root.display(), changes = changes.len(), "computed changes");
        self.snapshot = current;
        Ok(changes)
    }

    /// Replace the baseline with the current content of `root` without
    /// reporting anything.
    pub fn rebaseline(&mut self, root: &Path) -> Result<()> {
        self.snapshot = snapshot(root)?;
        Ok(())
    }

    /// Forget the baseline.
    pub fn reset(&mut self) {
        self.snapshot = Tree::new();
    }
}

fn snapshot(root: &Path) -> Result<Tree> {
    if !root.is_dir() {
        return Ok(Tree::new());
    }
    reader::read_tree(root, None, &GlobFilter::all())
}

/// Replay `changes` in order, copying content from `source` into `target`.
///
/// `create`/`change` copy the file from `source`, `mkdir` creates the
/// directory, `unlink` and `rmdir` remove from `target`. Directory removal is
/// not recursive: it only succeeds because the children were removed first.
pub fn replay(changes: &ChangeSet, source: &Path, target: &Path) -> Result<()> {
    for (path, op) in changes.iter() {
        let rel = path.trim_end_matches('/');
        let dst = guard::resolve(target, rel)?;
        debug!(path, op = %op, "replaying change");
        match op {
            ChangeOp::Mkdir => match fs::create_dir(&dst) {
                Err(e) if e.kind() != io::ErrorKind::AlreadyExists => {
                    return Err(io_at(&dst)(e))
                }
                _ => {}
            },
            ChangeOp::Create | ChangeOp::Change => {
                let src = guard::resolve(source, rel)?;
                fs::copy(&src, &dst).map_err(io_at(&src))?;
            }
            ChangeOp::Unlink => fs::remove_file(&dst).map_err(io_at(&dst))?,
            ChangeOp::Rmdir => fs::remove_dir(&dst).map_err(io_at(&dst))?,
        }
    }
    Ok(())
}
