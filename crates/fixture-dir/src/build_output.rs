// build_output.rs — Read and change-tracking handle over a builder's output.
//
// The handle never writes to the output path itself. The builder owns that
// directory: `build` delegates to it, `dispose` asks it to clean up. The
// change baseline is captured when the handle is created, so the first
// `changes` after a build reports exactly what that build produced.

use std::path::Path;

use async_trait::async_trait;
use fixture_tree::ChangeSet;
use tracing::{info, warn};

use crate::error::{FixtureError, Result};
use crate::readable::ReadableDir;
use crate::tracker::ChangeTracker;

/// An external build step with a fixed output directory.
#[async_trait]
pub trait Builder: Send {
    /// Directory the builder writes its output into.
    fn output_path(&self) -> &Path;

    /// Run one build, updating the output directory.
    async fn build(&mut self) -> Result<()>;

    /// Release everything the builder owns, including its output.
    async fn cleanup(&mut self) -> Result<()>;
}

/// Wraps a [`Builder`] with the read family and ordered change tracking.
pub struct BuildOutput<B: Builder> {
    builder: B,
    tracker: ChangeTracker,
    disposed: bool,
}

impl<B: Builder> BuildOutput<B> {
    /// Bind to `builder`, taking its current output as the change baseline.
    pub fn new(builder: B) -> Result<Self> {
        let tracker = ChangeTracker::new(builder.output_path())?;
        Ok(Self {
            builder,
            tracker,
            disposed: false,
        })
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    /// Run the builder once.
    pub async fn build(&mut self) -> Result<()> {
        self.check_live()?;
        info!(output = %self.builder.output_path().display(), "building");
        self.builder.build().await
    }

    /// Build and hand back the handle for chaining.
    pub async fn rebuild(&mut self) -> Result<&mut Self> {
        self.build().await?;
        Ok(self)
    }

    /// Changes to the output since the previous call or since creation.
    pub fn changes(&mut self) -> Result<ChangeSet> {
        self.check_live()?;
        let root = self.builder.output_path().to_path_buf();
        self.tracker.changes(&root)
    }

    /// Clean up the builder and drop the tracked state. Safe to call twice.
    pub async fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        self.tracker.reset();

        let output = self.builder.output_path().to_path_buf();
        if !output.exists() {
            warn!(output = %output.display(), "builder output already removed");
        }
        info!(output = %output.display(), "disposing build output");
        self.builder.cleanup().await
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<B: Builder> ReadableDir for BuildOutput<B> {
    fn root_path(&self) -> &Path {
        self.builder.output_path()
    }

    fn check_live(&self) -> Result<()> {
        if self.disposed {
            return Err(FixtureError::Disposed {
                path: self.builder.output_path().to_path_buf(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_tree;
    use fixture_tree::{ChangeOp, Tree};
    use std::fs;
    use std::path::PathBuf;

    /// Rebuilds its output from an in-memory tree on every build.
    struct TreeBuilder {
        output: PathBuf,
        fixture: Tree,
        _scratch: tempfile::TempDir,
    }

    impl TreeBuilder {
        fn new(fixture: Tree) -> Self {
            let scratch = tempfile::tempdir().unwrap();
            let output = scratch.path().join("out");
            fs::create_dir(&output).unwrap();
            Self {
                output,
                fixture,
                _scratch: scratch,
            }
        }
    }

    #[async_trait]
    impl Builder for TreeBuilder {
        fn output_path(&self) -> &Path {
            &self.output
        }

        async fn build(&mut self) -> Result<()> {
            if self.output.exists() {
                fs::remove_dir_all(&self.output).map_err(FixtureError::build)?;
            }
            fs::create_dir(&self.output).map_err(FixtureError::build)?;
            write_tree(&self.output, &self.fixture, None)
        }

        async fn cleanup(&mut self) -> Result<()> {
            if self.output.exists() {
                fs::remove_dir_all(&self.output).map_err(FixtureError::build)?;
            }
            Ok(())
        }
    }

    struct FailingBuilder {
        output: PathBuf,
    }

    #[async_trait]
    impl Builder for FailingBuilder {
        fn output_path(&self) -> &Path {
            &self.output
        }

        async fn build(&mut self) -> Result<()> {
            Err(FixtureError::build("syntax error in index.ts"))
        }

        async fn cleanup(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn fixture() -> Tree {
        Tree::new()
            .with_file("hello.txt", "hello world")
            .with_dir("lib", Tree::new().with_file("more.txt", "even more"))
    }

    fn ops(changes: &ChangeSet) -> Vec<(&str, ChangeOp)> {
        changes.iter().collect()
    }

    #[tokio::test]
    async fn read_after_build() {
        let mut subject = BuildOutput::new(TreeBuilder::new(fixture())).unwrap();
        assert_eq!(subject.read(None, None).unwrap(), Tree::new());

        subject.build().await.unwrap();

        assert_eq!(subject.read(None, None).unwrap(), fixture());
        assert_eq!(
            subject.read(Some("lib"), None).unwrap(),
            Tree::new().with_file("more.txt", "even more")
        );
        subject.dispose().await.unwrap();
    }

    #[tokio::test]
    async fn changes_on_build_and_rebuild() {
        let mut subject = BuildOutput::new(TreeBuilder::new(fixture())).unwrap();
        assert!(subject.changes().unwrap().is_empty());

        subject.build().await.unwrap();
        assert_eq!(
            ops(&subject.changes().unwrap()),
            vec![
                ("hello.txt", ChangeOp::Create),
                ("lib/", ChangeOp::Mkdir),
                ("lib/more.txt", ChangeOp::Create),
            ]
        );

        subject.builder_mut().fixture = Tree::new().with_file("hello.txt", "goodbye");
        subject.rebuild().await.unwrap();
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
        subject.dispose().await.unwrap();
    }

    #[tokio::test]
    async fn baseline_ignores_output_present_before_binding() {
        let builder = TreeBuilder::new(fixture());
        write_tree(builder.output_path(), &fixture(), None).unwrap();
        let mut subject = BuildOutput::new(builder).unwrap();

        subject.build().await.unwrap();

        assert!(subject.changes().unwrap().is_empty());
        subject.dispose().await.unwrap();
    }

    #[tokio::test]
    async fn dispose_cleans_up_builder() {
        let mut subject = BuildOutput::new(TreeBuilder::new(fixture())).unwrap();
        subject.build().await.unwrap();
        let output = subject.builder().output_path().to_path_buf();

        subject.dispose().await.unwrap();

        assert!(!output.exists());
        assert!(subject.is_disposed());
        assert!(subject.read(None, None).unwrap_err().is_not_found());
        assert!(subject.changes().unwrap_err().is_not_found());
        assert!(subject.build().await.unwrap_err().is_not_found());
        subject.dispose().await.unwrap();
    }

    #[tokio::test]
    async fn dispose_tolerates_missing_output() {
        let mut subject = BuildOutput::new(TreeBuilder::new(fixture())).unwrap();
        fs::remove_dir_all(subject.builder().output_path()).unwrap();

        subject.dispose().await.unwrap();
    }

    #[tokio::test]
    async fn build_failure_is_surfaced() {
        let scratch = tempfile::tempdir().unwrap();
        let mut subject = BuildOutput::new(FailingBuilder {
            output: scratch.path().to_path_buf(),
        })
        .unwrap();

        let err = subject.build().await.unwrap_err();

        assert!(matches!(err, FixtureError::Build(_)));
        assert!(err.to_string().contains("syntax error"));
    }
}
