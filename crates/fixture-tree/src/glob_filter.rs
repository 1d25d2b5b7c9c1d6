// glob_filter.rs — Include/exclude glob filtering for directory reads.
//
// Patterns are evaluated against `/`-separated paths relative to the read
// root. `*` never crosses a separator; `**` spans any number of directories.
//
// Rules:
// 1. No include list means every file is included.
// 2. An exclude match always wins over an include match.
// 3. An excluded directory is pruned together with everything below it.
//    Directories are matched with and without a trailing `/`, so both
//    "dist/tests" and "dist/tests/" exclude the directory.
// 4. Include lists select files. Directories are never dropped for failing
//    an include pattern; they are kept when anything below them is kept.

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// Caller-facing glob options for `read` and `read_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobSpec {
    /// Patterns a file must match to be kept. `None` keeps everything.
    #[serde(default)]
    pub include: Option<Vec<String>>,

    /// Patterns that remove files and prune directories.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether flattened listings contain directory entries (`dir/`).
    #[serde(default = "default_directories")]
    pub directories: bool,
}

fn default_directories() -> bool {
    true
}

impl Default for GlobSpec {
    fn default() -> Self {
        Self {
            include: None,
            exclude: Vec::new(),
            directories: default_directories(),
        }
    }
}

impl GlobSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn directories(mut self, directories: bool) -> Self {
        self.directories = directories;
        self
    }

    /// Compile into a [`GlobFilter`].
    pub fn compile(&self) -> Result<GlobFilter, TreeError> {
        GlobFilter::new(self)
    }
}

/// Compiled include/exclude patterns. Pure: never touches the filesystem.
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    include: Option<Vec<Pattern>>,
    exclude: Vec<Pattern>,
}

fn compile_all(patterns: &[String]) -> Result<Vec<Pattern>, TreeError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| TreeError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

fn any_match(patterns: &[Pattern], path: &str) -> bool {
    let opts = match_options();
    patterns.iter().any(|p| p.matches_with(path, opts))
}

impl GlobFilter {
    pub fn new(spec: &GlobSpec) -> Result<Self, TreeError> {
        let include = spec.include.as_deref().map(compile_all).transpose()?;
        let exclude = compile_all(&spec.exclude)?;
        Ok(Self { include, exclude })
    }

    /// A filter that keeps everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// True when an include list is present (directories then need a kept
    /// descendant to be kept).
    pub fn has_include(&self) -> bool {
        self.include.is_some()
    }

    /// Whether a file at `rel_path` is kept.
    pub fn keeps_file(&self, rel_path: &str) -> bool {
        let included = match &self.include {
            Some(patterns) => any_match(patterns, rel_path),
            None => true,
        };
        included && !any_match(&self.exclude, rel_path)
    }

    /// Whether the directory at `rel_path` (no trailing `/`) is pruned.
    pub fn prunes_dir(&self, rel_path: &str) -> bool {
        any_match(&self.exclude, rel_path) || any_match(&self.exclude, &format!("{rel_path}/"))
    }

    /// Whether the directory at `rel_path` matches an include pattern by
    /// itself. With no include list every directory matches.
    pub fn includes_dir(&self, rel_path: &str) -> bool {
        match &self.include {
            Some(patterns) => {
                any_match(patterns, rel_path) || any_match(patterns, &format!("{rel_path}/"))
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(spec: GlobSpec) -> GlobFilter {
        spec.compile().unwrap()
    }

    #[test]
    fn empty_spec_keeps_everything() {
        let f = filter(GlobSpec::new());
        assert!(f.keeps_file("package.json"));
        assert!(f.keeps_file("dist/tests/test.js"));
        assert!(!f.prunes_dir("dist"));
        assert!(f.includes_dir("dist"));
        assert!(!f.has_include());
    }

    #[test]
    fn double_star_extension_matches_any_depth() {
        let f = filter(GlobSpec::new().include(["**/*.js"]));
        assert!(f.keeps_file("index.js"));
        assert!(f.keeps_file("dist/index.js"));
        assert!(f.keeps_file("dist/tests/test.js"));
        assert!(!f.keeps_file("src/index.ts"));
        assert!(!f.keeps_file("package.json"));
    }

    #[test]
    fn single_star_does_not_cross_separator() {
        let f = filter(GlobSpec::new().include(["dist/*.js"]));
        assert!(f.keeps_file("dist/index.js"));
        assert!(!f.keeps_file("dist/tests/test.js"));
    }

    #[test]
    fn exclude_prunes_directory_by_path() {
        let f = filter(
            GlobSpec::new()
                .include(["dist/**"])
                .exclude(["dist/tests"]),
        );
        assert!(f.keeps_file("dist/index.js"));
        assert!(f.prunes_dir("dist/tests"));
        assert!(!f.prunes_dir("dist"));
    }

    #[test]
    fn exclude_with_trailing_slash_prunes_directory() {
        let f = filter(GlobSpec::new().exclude(["node_modules/"]));
        assert!(f.prunes_dir("node_modules"));
        assert!(!f.prunes_dir("src"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let f = filter(GlobSpec::new().include(["**/*.ts"]).exclude(["**/*.d.ts"]));
        assert!(f.keeps_file("src/index.ts"));
        assert!(!f.keeps_file("src/index.d.ts"));
    }

    #[test]
    fn literal_paths_match_exactly() {
        let f = filter(GlobSpec::new().include(["src/index.ts"]));
        assert!(f.keeps_file("src/index.ts"));
        assert!(!f.keeps_file("src/index.tsx"));
        assert!(!f.keeps_file("other/src/index.ts"));
    }

    #[test]
    fn include_dir_matches_with_trailing_slash_form() {
        let f = filter(GlobSpec::new().include(["dist/**"]));
        assert!(f.includes_dir("dist/tests"));
        assert!(!f.includes_dir("src"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = GlobSpec::new().include(["[unclosed"]).compile().unwrap_err();
        assert!(matches!(err, TreeError::InvalidGlob { pattern, .. } if pattern == "[unclosed"));
    }

    #[test]
    fn spec_defaults_list_directories() {
        assert!(GlobSpec::default().directories);
        let spec: GlobSpec = serde_json::from_str(r#"{ "include": ["**/*.js"] }"#).unwrap();
        assert!(spec.directories);
        assert!(spec.exclude.is_empty());
    }
}
