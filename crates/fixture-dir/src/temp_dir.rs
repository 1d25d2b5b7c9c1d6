// temp_dir.rs — Disposable temporary directory handle.
//
// A TempDir owns a freshly created directory under the configured temp root,
// plus the change tracker for it. All writes and reads go through the path
// guard. `dispose` removes the directory; every later operation fails with
// a not-found class error, and a second `dispose` is a no-op.

use std::path::{Path, PathBuf};

use fixture_tree::{ChangeSet, Encoding, Tree};
use tracing::info;

use crate::config::FixtureConfig;
use crate::error::{io_at, FixtureError, Result};
use crate::readable::ReadableDir;
use crate::tracker::ChangeTracker;
use crate::writer;

/// A temporary fixture directory.
#[derive(Debug)]
pub struct TempDir {
    root: PathBuf,
    dir: Option<tempfile::TempDir>,
    tracker: ChangeTracker,
    default_encoding: Encoding,
}

impl TempDir {
    /// Create a temporary directory with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&FixtureConfig::default())
    }

    /// Create a temporary directory under `config.temp_root`.
    pub fn with_config(config: &FixtureConfig) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.prefix);
        let dir = match &config.temp_root {
            Some(parent) => builder.tempdir_in(parent).map_err(io_at(parent))?,
            None => builder
                .tempdir()
                .map_err(io_at(std::env::temp_dir()))?,
        };
        let root = dir.path().to_path_buf();
        info!(root = %root.display(), "created temp dir");

        Ok(Self {
            root,
            dir: Some(dir),
            tracker: ChangeTracker::empty(),
            default_encoding: config.default_encoding,
        })
    }

    /// Apply `tree` to the directory, or to the `to` subdirectory.
    pub fn write(&self, tree: &Tree, to: Option<&str>) -> Result<()> {
        self.check_live()?;
        writer::write_tree(&self.root, tree, to)
    }

    /// Write raw bytes to a file, creating parent directories.
    pub fn write_binary(&self, subpath: &str, bytes: &[u8]) -> Result<()> {
        self.check_live()?;
        writer::write_bytes(&self.root, subpath, bytes)
    }

    /// Write text to a file with `encoding` (or the configured default).
    pub fn write_text(&self, subpath: &str, text: &str, encoding: Option<Encoding>) -> Result<()> {
        self.check_live()?;
        let encoding = encoding.unwrap_or(self.default_encoding);
        writer::write_text(&self.root, subpath, text, encoding)
    }

    /// Create a directory and any missing parents.
    pub fn make_dir(&self, subpath: &str) -> Result<()> {
        self.check_live()?;
        writer::make_dir(&self.root, subpath)
    }

    /// Copy an external directory into this one, merging with what is there.
    pub fn copy(&self, from: impl AsRef<Path>, to: Option<&str>) -> Result<()> {
        self.check_live()?;
        writer::copy_dir(&self.root, from.as_ref(), to)
    }

    /// Changes since the previous call, or since creation on the first call.
    pub fn changes(&mut self) -> Result<ChangeSet> {
        self.check_live()?;
        self.tracker.changes(&self.root)
    }

    /// Remove the directory. Safe to call more than once.
    pub fn dispose(&mut self) -> Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        self.tracker.reset();
        info!(root = %self.root.display(), "disposing temp dir");
        dir.close().map_err(io_at(&self.root))
    }

    pub fn is_disposed(&self) -> bool {
        self.dir.is_none()
    }
}

impl ReadableDir for TempDir {
    fn root_path(&self) -> &Path {
        &self.root
    }

    fn check_live(&self) -> Result<()> {
        if self.dir.is_none() {
            return Err(FixtureError::Disposed {
                path: self.root.clone(),
            });
        }
        Ok(())
    }

    fn default_encoding(&self) -> Encoding {
        self.default_encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_tree::{ChangeOp, GlobSpec};
    use std::fs;

    fn dir_names(path: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(path)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn ops(changes: &ChangeSet) -> Vec<(&str, ChangeOp)> {
        changes.iter().collect()
    }

    #[test]
    fn writing() {
        let subject = TempDir::new().unwrap();

        subject
            .write(
                &Tree::new()
                    .with_file("file.txt", "hello world")
                    .with_dir("lib", Tree::new()),
                None,
            )
            .unwrap();
        assert_eq!(dir_names(&subject.path("").unwrap()), vec!["file.txt", "lib"]);
        assert_eq!(
            fs::read_to_string(subject.path("file.txt").unwrap()).unwrap(),
            "hello world"
        );

        subject
            .write(&Tree::new().with_file("more.txt", "another"), Some("lib"))
            .unwrap();
        assert_eq!(
            fs::read_to_string(subject.path("lib/more.txt").unwrap()).unwrap(),
            "another"
        );

        subject.write(&Tree::new().with_removal("lib"), None).unwrap();
        assert_eq!(dir_names(subject.root_path()), vec!["file.txt"]);
    }

    #[test]
    fn binary_round_trip() {
        let subject = TempDir::new().unwrap();
        let gif: Vec<u8> = vec![
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x00, 0xff, 0x00, 0x2c,
        ];

        subject.write_binary("images/test.gif", &gif).unwrap();

        assert_eq!(fs::read(subject.path("images/test.gif").unwrap()).unwrap(), gif);
        assert_eq!(subject.read_binary("images/test.gif").unwrap(), Some(gif));
    }

    #[test]
    fn text_with_encoding() {
        let subject = TempDir::new().unwrap();

        subject
            .write_text("texts/ucs2.txt", "\u{10437}", Some(Encoding::Utf16Le))
            .unwrap();
        subject.write_text("texts/utf8.txt", "\u{10437}", None).unwrap();

        assert_eq!(
            subject.read_text("texts/ucs2.txt", Some(Encoding::Hex)).unwrap().as_deref(),
            Some("01d837dc")
        );
        assert_eq!(
            subject.read_text("texts/utf8.txt", Some(Encoding::Hex)).unwrap().as_deref(),
            Some("f09090b7")
        );
        assert_eq!(
            subject.read_text("texts/ucs2.txt", Some(Encoding::Utf16Le)).unwrap().as_deref(),
            Some("\u{10437}")
        );
        assert_eq!(
            subject.read_text("texts/utf8.txt", None).unwrap().as_deref(),
            Some("\u{10437}")
        );
    }

    #[test]
    fn configured_default_encoding_applies() {
        let config = FixtureConfig {
            default_encoding: Encoding::Utf16Le,
            ..FixtureConfig::default()
        };
        let subject = TempDir::with_config(&config).unwrap();

        subject.write_text("a.txt", "hi", None).unwrap();

        assert_eq!(
            fs::read(subject.path("a.txt").unwrap()).unwrap(),
            vec![b'h', 0, b'i', 0]
        );
        assert_eq!(subject.read_text("a.txt", None).unwrap().as_deref(), Some("hi"));
    }

    #[test]
    fn missing_files_read_as_none() {
        let subject = TempDir::new().unwrap();
        assert_eq!(subject.read_text("missing.txt", Some(Encoding::Utf16Le)).unwrap(), None);
        assert_eq!(subject.read_binary("image.gif").unwrap(), None);
    }

    #[test]
    fn making_a_directory() {
        let subject = TempDir::new().unwrap();
        subject.make_dir("images").unwrap();
        assert!(subject.path("images").unwrap().is_dir());
    }

    #[test]
    fn reading() {
        let subject = TempDir::new().unwrap();
        fs::write(subject.path("file.txt").unwrap(), "hello world").unwrap();
        fs::create_dir(subject.path("lib").unwrap()).unwrap();
        fs::write(subject.path("lib/more.txt").unwrap(), "another").unwrap();

        assert_eq!(
            subject.read(None, None).unwrap(),
            Tree::new()
                .with_file("file.txt", "hello world")
                .with_dir("lib", Tree::new().with_file("more.txt", "another"))
        );
        assert_eq!(
            subject.read(Some("lib"), None).unwrap(),
            Tree::new().with_file("more.txt", "another")
        );
    }

    #[test]
    fn reading_with_globs() {
        let subject = TempDir::new().unwrap();
        subject
            .write(
                &Tree::new()
                    .with_dir(
                        "dist",
                        Tree::new()
                            .with_file("index.js", "")
                            .with_dir("tests", Tree::new().with_file("test.js", "")),
                    )
                    .with_file("package.json", "")
                    .with_dir("src", Tree::new().with_file("index.ts", "")),
                None,
            )
            .unwrap();

        assert_eq!(
            subject
                .read(None, Some(&GlobSpec::new().include(["**/*.js"])))
                .unwrap(),
            Tree::new().with_dir(
                "dist",
                Tree::new()
                    .with_file("index.js", "")
                    .with_dir("tests", Tree::new().with_file("test.js", ""))
            )
        );
        assert_eq!(
            subject
                .read(Some("dist"), Some(&GlobSpec::new().include(["**/test.js"])))
                .unwrap(),
            Tree::new().with_dir("tests", Tree::new().with_file("test.js", ""))
        );
        assert_eq!(
            subject
                .read_dir(None, Some(&GlobSpec::new().directories(false).include(["**/*.js"])))
                .unwrap(),
            Some(vec!["dist/index.js".to_string(), "dist/tests/test.js".to_string()])
        );
    }

    #[test]
    fn changes_are_ordered() {
        let mut subject = TempDir::new().unwrap();
        assert!(subject.changes().unwrap().is_empty());

        subject
            .write(
                &Tree::new()
                    .with_file("hello.txt", "hello")
                    .with_dir("lib", Tree::new().with_file("more.txt", "more")),
                None,
            )
            .unwrap();
        assert_eq!(
            ops(&subject.changes().unwrap()),
            vec![
                ("hello.txt", ChangeOp::Create),
                ("lib/", ChangeOp::Mkdir),
                ("lib/more.txt", ChangeOp::Create),
            ]
        );

        subject
            .write(
                &Tree::new().with_file("hello.txt", "goodbye").with_removal("lib"),
                None,
            )
            .unwrap();
        assert_eq!(
            ops(&subject.changes().unwrap()),
            vec![
                ("lib/more.txt", ChangeOp::Unlink),
                ("lib/", ChangeOp::Rmdir),
                ("hello.txt", ChangeOp::Change),
            ]
        );
        assert_eq!(
            subject.read(None, None).unwrap(),
            Tree::new().with_file("hello.txt", "goodbye")
        );
    }

    #[test]
    fn configured_prefix_and_root() {
        let parent = tempfile::tempdir().unwrap();
        let config = FixtureConfig {
            temp_root: Some(parent.path().to_path_buf()),
            prefix: "app-".to_string(),
            ..FixtureConfig::default()
        };

        let subject = TempDir::with_config(&config).unwrap();

        assert!(subject.root_path().starts_with(parent.path()));
        let name = subject.root_path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("app-"));
    }

    #[test]
    fn dispose_removes_directory() {
        let mut subject = TempDir::new().unwrap();
        let root = subject.root_path().to_path_buf();
        subject.write(&Tree::new().with_file("a", "a"), None).unwrap();

        subject.dispose().unwrap();

        assert!(!root.exists());
        assert!(subject.is_disposed());
        assert!(subject.read(None, None).unwrap_err().is_not_found());
        assert!(subject.read_dir(None, None).unwrap_err().is_not_found());
        assert!(subject.changes().unwrap_err().is_not_found());
        assert!(subject.write(&Tree::new(), None).unwrap_err().is_not_found());
        subject.dispose().unwrap();
    }

    #[test]
    fn writing_outside_fails() {
        let subject = TempDir::new().unwrap();
        let err = subject.write(&Tree::new(), Some("..")).unwrap_err();
        assert!(err.to_string().contains("subpath should not escape directory"));
    }

    #[test]
    fn dot_tombstone_leaves_root_in_place() {
        let subject = TempDir::new().unwrap();
        subject.write(&Tree::new().with_file("a", "a"), None).unwrap();

        let err = subject.write(&Tree::new().with_removal("."), None).unwrap_err();

        assert!(matches!(err, FixtureError::InvalidEntryName { .. }));
        assert_eq!(
            subject.read(None, None).unwrap(),
            Tree::new().with_file("a", "a")
        );
    }
}
