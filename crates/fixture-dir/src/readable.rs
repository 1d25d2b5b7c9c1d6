// readable.rs — The read family shared by every directory handle.
//
// Implementors supply the root path, a liveness check, and a default
// encoding; the read operations themselves are provided methods, so a
// temporary directory and a build output read the same way.

use std::path::{Path, PathBuf};

use fixture_tree::{Encoding, GlobFilter, GlobSpec, Tree};

use crate::error::Result;
use crate::guard;
use crate::reader;

/// A directory whose content can be read as a [`Tree`] or a flat listing.
pub trait ReadableDir {
    /// Absolute root of the directory.
    fn root_path(&self) -> &Path;

    /// Fail with a not-found class error once the handle is disposed.
    fn check_live(&self) -> Result<()>;

    /// Encoding used by [`read_text`](Self::read_text) when none is given.
    fn default_encoding(&self) -> Encoding {
        Encoding::Utf8
    }

    /// Absolute path of `subpath` inside the root. `""` is the root itself.
    fn path(&self, subpath: &str) -> Result<PathBuf> {
        guard::resolve(self.root_path(), subpath)
    }

    /// Read the directory (or `from` below it) into a Tree.
    fn read(&self, from: Option<&str>, glob: Option<&GlobSpec>) -> Result<Tree> {
        self.check_live()?;
        let filter = match glob {
            Some(spec) => spec.compile()?,
            None => GlobFilter::all(),
        };
        reader::read_tree(self.root_path(), from, &filter)
    }

    /// Raw bytes of a file, `None` if it does not exist.
    fn read_binary(&self, subpath: &str) -> Result<Option<Vec<u8>>> {
        self.check_live()?;
        reader::read_binary(self.root_path(), subpath)
    }

    /// Decoded text of a file, `None` if it does not exist.
    fn read_text(&self, subpath: &str, encoding: Option<Encoding>) -> Result<Option<String>> {
        self.check_live()?;
        let encoding = encoding.unwrap_or_else(|| self.default_encoding());
        reader::read_text(self.root_path(), subpath, encoding)
    }

    /// Flat sorted listing, `None` if the target is missing or not a directory.
    fn read_dir(&self, subpath: Option<&str>, options: Option<&GlobSpec>) -> Result<Option<Vec<String>>> {
        self.check_live()?;
        let default_spec = GlobSpec::default();
        reader::list_dir(self.root_path(), subpath, options.unwrap_or(&default_spec))
    }
}
