//! # fixture-dir
//!
//! Real directories driven by [`fixture_tree::Tree`] values, for tests that
//! seed, mutate, inspect, and diff filesystem fixtures.
//!
//! ## Key components
//!
//! - [`TempDir`] — a disposable temporary directory: sparse tree writes,
//!   single-file writes, filtered reads, and ordered change tracking.
//! - [`BuildOutput`] — the same read and change contract over the output
//!   path of an external [`Builder`].
//! - [`ReadableDir`] — the read family shared by both handles.
//! - [`ChangeTracker`] — owns the last snapshot and diffs against disk.
//! - [`guard::resolve`] — keeps every subpath inside its root.

pub mod build_output;
pub mod config;
pub mod error;
pub mod guard;
pub mod readable;
pub mod reader;
pub mod temp_dir;
pub mod tracker;
pub mod writer;

pub use build_output::{BuildOutput, Builder};
pub use config::FixtureConfig;
pub use error::{FixtureError, Result};
pub use readable::ReadableDir;
pub use temp_dir::TempDir;
pub use tracker::{replay, ChangeTracker};

pub use fixture_tree::{
    ChangeOp, ChangeSet, Encoding, FileContent, GlobFilter, GlobSpec, Tree, TreeEntry,
};
