// changes.rs — Ordered change sets and the tree diff that produces them.
//
// A ChangeSet maps relative paths to one of five operations. Directory paths
// carry a trailing `/`, file paths do not. The order of a ChangeSet is part of
// its contract: replaying the operations in listed order must never remove a
// non-empty directory or create an entry under a missing parent.
//
// diff_trees emits every removal first (children before their directory),
// then every creation and content change (directory before its children).
// Siblings keep the insertion order of the tree they come from.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tree::{Tree, TreeEntry};

/// A single filesystem operation in a [`ChangeSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    /// A file appeared.
    Create,
    /// A file's content differs.
    Change,
    /// A file disappeared.
    Unlink,
    /// A directory appeared.
    Mkdir,
    /// A directory disappeared.
    Rmdir,
}

impl ChangeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOp::Create => "create",
            ChangeOp::Change => "change",
            ChangeOp::Unlink => "unlink",
            ChangeOp::Mkdir => "mkdir",
            ChangeOp::Rmdir => "rmdir",
        }
    }

    /// True for operations that take something away (`unlink`, `rmdir`).
    pub fn is_removal(&self) -> bool {
        matches!(self, ChangeOp::Unlink | ChangeOp::Rmdir)
    }

    /// True for operations on directories (`mkdir`, `rmdir`).
    pub fn is_dir_op(&self) -> bool {
        matches!(self, ChangeOp::Mkdir | ChangeOp::Rmdir)
    }
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered mapping from relative path to [`ChangeOp`].
///
/// Equality compares contents only; use [`ChangeSet::iter`] to assert order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    ops: IndexMap<String, ChangeOp>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<ChangeOp> {
        self.ops.get(path).copied()
    }

    /// Operations in replay order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ChangeOp)> {
        self.ops.iter().map(|(path, op)| (path.as_str(), *op))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    fn push(&mut self, path: String, op: ChangeOp) {
        self.ops.insert(path, op);
    }
}

impl<K: Into<String>> FromIterator<(K, ChangeOp)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (K, ChangeOp)>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().map(|(path, op)| (path.into(), op)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a String, &'a ChangeOp);
    type IntoIter = indexmap::map::Iter<'a, String, ChangeOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Compute the ordered changes that turn `old` into `new`.
///
/// Directories present on both sides are not reported themselves; their
/// content is compared recursively. An entry that changes kind (file to
/// directory or back) is reported as a removal followed by a creation.
/// Tombstones are treated as absent entries.
pub fn diff_trees(old: &Tree, new: &Tree) -> ChangeSet {
    let mut changes = ChangeSet::new();
    collect_removals(old, new, "", &mut changes);
    collect_additions(old, new, "", &mut changes);
    tracing::debug!(count = changes.len(), "computed tree diff");
    changes
}

/// An entry that exists for diffing purposes (tombstones do not).
fn present<'a>(tree: &'a Tree, name: &str) -> Option<&'a TreeEntry> {
    match tree.get(name) {
        Some(TreeEntry::Remove) | None => None,
        Some(entry) => Some(entry),
    }
}

fn collect_removals(old: &Tree, new: &Tree, prefix: &str, out: &mut ChangeSet) {
    for (name, old_entry) in old.iter() {
        let path = format!("{prefix}{name}");
        match (old_entry, present(new, name)) {
            (TreeEntry::Dir(old_dir), Some(TreeEntry::Dir(new_dir))) => {
                collect_removals(old_dir, new_dir, &format!("{path}/"), out);
            }
            (TreeEntry::File(_), Some(TreeEntry::File(_))) => {}
            (entry, _) => remove_subtree(entry, &path, out),
        }
    }
}

fn collect_additions(old: &Tree, new: &Tree, prefix: &str, out: &mut ChangeSet) {
    for (name, new_entry) in new.iter() {
        let path = format!("{prefix}{name}");
        match (present(old, name), new_entry) {
            (Some(TreeEntry::Dir(old_dir)), TreeEntry::Dir(new_dir)) => {
                collect_additions(old_dir, new_dir, &format!("{path}/"), out);
            }
            (Some(TreeEntry::File(before)), TreeEntry::File(after)) => {
                if before != after {
                    out.push(path, ChangeOp::Change);
                }
            }
            (_, entry) => create_subtree(entry, &path, out),
        }
    }
}

/// Children first, then the directory itself.
fn remove_subtree(entry: &TreeEntry, path: &str, out: &mut ChangeSet) {
    match entry {
        TreeEntry::File(_) => out.push(path.to_string(), ChangeOp::Unlink),
        TreeEntry::Dir(tree) => {
            let dir_path = format!("{path}/");
            for (name, child) in tree.iter() {
                remove_subtree(child, &format!("{dir_path}{name}"), out);
            }
            out.push(dir_path, ChangeOp::Rmdir);
        }
        TreeEntry::Remove => {}
    }
}

/// The directory itself, then its children.
fn create_subtree(entry: &TreeEntry, path: &str, out: &mut ChangeSet) {
    match entry {
        TreeEntry::File(_) => out.push(path.to_string(), ChangeOp::Create),
        TreeEntry::Dir(tree) => {
            let dir_path = format!("{path}/");
            out.push(dir_path.clone(), ChangeOp::Mkdir);
            for (name, child) in tree.iter() {
                create_subtree(child, &format!("{dir_path}{name}"), out);
            }
        }
        TreeEntry::Remove => {}
    }
}
