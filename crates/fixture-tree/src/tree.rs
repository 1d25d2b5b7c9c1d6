// tree.rs — Recursive in-memory model of a directory's content.
//
// A Tree maps entry names to TreeEntry values. Three kinds of entry share one
// map: file content, a nested directory, and a removal tombstone. The same
// type describes what to write (tombstones allowed) and what was read back
// from disk (never contains tombstones).
//
// In JSON a tree has the natural fixture shape:
//   { "hello.txt": "hello", "lib": { "more.txt": "more" }, "old": null }

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// The payload of a single file.
///
/// Text and binary payloads compare equal when their bytes are equal, so a
/// tree read back from disk matches the tree that was written regardless of
/// which variant the caller used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileContent {
    /// UTF-8 text.
    Text(String),
    /// Arbitrary bytes (serialized as a JSON array of numbers).
    Binary(Vec<u8>),
}

impl FileContent {
    /// Classify raw bytes: valid UTF-8 becomes `Text`, anything else `Binary`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(e) => FileContent::Binary(e.into_bytes()),
        }
    }

    /// The raw bytes that end up on disk.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(text) => text.as_bytes(),
            FileContent::Binary(bytes) => bytes,
        }
    }

    /// The content as text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(text) => Some(text),
            FileContent::Binary(bytes) => std::str::from_utf8(bytes).ok(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl PartialEq for FileContent {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for FileContent {}

impl From<&str> for FileContent {
    fn from(text: &str) -> Self {
        FileContent::Text(text.to_string())
    }
}

impl From<String> for FileContent {
    fn from(text: String) -> Self {
        FileContent::Text(text)
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(bytes: Vec<u8>) -> Self {
        FileContent::Binary(bytes)
    }
}

impl From<&[u8]> for FileContent {
    fn from(bytes: &[u8]) -> Self {
        FileContent::Binary(bytes.to_vec())
    }
}

/// One slot in a [`Tree`].
///
/// `Remove` serializes as JSON `null`. Variant order matters for untagged
/// deserialization: strings and byte arrays are files, objects are
/// directories, and `null` is the tombstone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeEntry {
    /// A file with the given content.
    File(FileContent),
    /// A subdirectory.
    Dir(Tree),
    /// Delete whatever exists at this name (no-op if nothing does).
    Remove,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        matches!(self, TreeEntry::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeEntry::Dir(_))
    }

    pub fn as_file(&self) -> Option<&FileContent> {
        match self {
            TreeEntry::File(content) => Some(content),
            _ => None,
        }
    }

    pub fn as_dir(&self) -> Option<&Tree> {
        match self {
            TreeEntry::Dir(tree) => Some(tree),
            _ => None,
        }
    }
}

impl From<FileContent> for TreeEntry {
    fn from(content: FileContent) -> Self {
        TreeEntry::File(content)
    }
}

impl From<&str> for TreeEntry {
    fn from(text: &str) -> Self {
        TreeEntry::File(text.into())
    }
}

impl From<String> for TreeEntry {
    fn from(text: String) -> Self {
        TreeEntry::File(text.into())
    }
}

impl From<Vec<u8>> for TreeEntry {
    fn from(bytes: Vec<u8>) -> Self {
        TreeEntry::File(bytes.into())
    }
}

impl From<Tree> for TreeEntry {
    fn from(tree: Tree) -> Self {
        TreeEntry::Dir(tree)
    }
}

/// A directory's content, keyed by entry name.
///
/// Iteration follows insertion order. Equality ignores order: two trees are
/// equal when they hold the same names with equal entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    entries: IndexMap<String, TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a fixture tree from JSON.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add a file entry (builder style).
    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<FileContent>) -> Self {
        self.entries
            .insert(name.into(), TreeEntry::File(content.into()));
        self
    }

    /// Add a subdirectory entry (builder style).
    pub fn with_dir(mut self, name: impl Into<String>, tree: Tree) -> Self {
        self.entries.insert(name.into(), TreeEntry::Dir(tree));
        self
    }

    /// Add a removal tombstone (builder style).
    pub fn with_removal(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), TreeEntry::Remove);
        self
    }

    /// Insert or replace an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<TreeEntry>) -> Option<TreeEntry> {
        self.entries.insert(name.into(), entry.into())
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    /// Look up an entry by a `/`-separated relative path, e.g. `lib/more.txt`.
    pub fn get_path(&self, path: &str) -> Option<&TreeEntry> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = self.entries.get(first)?;
        for segment in segments {
            current = current.as_dir()?.entries.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All file paths in the tree, depth first, `/`-separated.
    pub fn file_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_file_paths(self, "", &mut out);
        out
    }
}

fn collect_file_paths(tree: &Tree, prefix: &str, out: &mut Vec<String>) {
    for (name, entry) in tree.iter() {
        match entry {
            TreeEntry::File(_) => out.push(format!("{prefix}{name}")),
            TreeEntry::Dir(sub) => collect_file_paths(sub, &format!("{prefix}{name}/"), out),
            TreeEntry::Remove => {}
        }
    }
}

impl<K: Into<String>, V: Into<TreeEntry>> FromIterator<(K, V)> for Tree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, entry)| (name.into(), entry.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = (&'a String, &'a TreeEntry);
    type IntoIter = indexmap::map::Iter<'a, String, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
