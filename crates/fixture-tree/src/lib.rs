//! # fixture-tree
//!
//! The in-memory data model for filesystem fixtures.
//!
//! A [`Tree`] describes directory content without touching the disk: files
//! are [`FileContent`], subdirectories are nested trees, and
//! [`TreeEntry::Remove`] is a tombstone that deletes an entry when the tree is
//! written. Two successive trees can be compared with [`diff_trees`] to get an
//! ordered [`ChangeSet`] that is safe to replay in listed order.
//!
//! ## Key components
//!
//! - [`Tree`] / [`TreeEntry`] — recursive, insertion-ordered directory model.
//! - [`ChangeSet`] / [`ChangeOp`] — ordered `path -> operation` changes.
//! - [`GlobSpec`] / [`GlobFilter`] — include/exclude filtering for reads.
//! - [`Encoding`] — named byte serializations for text files.

pub mod changes;
pub mod encoding;
pub mod error;
pub mod glob_filter;
pub mod tree;

pub use changes::{diff_trees, ChangeOp, ChangeSet};
pub use encoding::Encoding;
pub use error::TreeError;
pub use glob_filter::{GlobFilter, GlobSpec};
pub use tree::{FileContent, Tree, TreeEntry};
