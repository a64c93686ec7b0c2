//! Source file filter.
//!
//! A static predicate over file names, used by a lexer to advertise which
//! files it understands. Patterns are globs (`*.java`, `*.{h,hpp}`) matched
//! against the file name only, never the directory part.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;

use crate::error::VarScopeError;

/// Error type for file filter construction.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid glob pattern syntax.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl From<FilterError> for VarScopeError {
    fn from(err: FilterError) -> Self {
        VarScopeError::config(err.to_string())
    }
}

/// Accepts files whose name matches one of a fixed set of patterns.
#[derive(Debug, Clone)]
pub struct FileFilter {
    patterns: Vec<String>,
    set: GlobSet,
}

impl FileFilter {
    /// Build a filter from glob patterns.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use varscope_core::filter::FileFilter;
    ///
    /// let filter = FileFilter::new(&["*.java"]).unwrap();
    /// assert!(filter.accepts(Path::new("src/Main.java")));
    /// assert!(!filter.accepts(Path::new("src/main.rs")));
    /// ```
    pub fn new(patterns: &[&str]) -> Result<Self, FilterError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| FilterError::InvalidPattern {
            pattern: "<combined>".to_string(),
            message: e.to_string(),
        })?;
        Ok(FileFilter {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            set,
        })
    }

    /// Build a filter accepting `*.<ext>` for each extension.
    pub fn for_extensions(extensions: &[&str]) -> Result<Self, FilterError> {
        let patterns: Vec<String> = extensions.iter().map(|ext| format!("*.{}", ext)).collect();
        let refs: Vec<&str> = patterns.iter().map(String::as_str).collect();
        Self::new(&refs)
    }

    /// True if the file name of `path` matches any pattern.
    pub fn accepts(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.set.is_match(Path::new(name)),
            None => false,
        }
    }

    /// The patterns this filter was built from.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_match_file_names() {
        let filter = FileFilter::for_extensions(&["java"]).unwrap();
        assert!(filter.accepts(Path::new("Main.java")));
        assert!(filter.accepts(Path::new("/deep/nested/dir/Main.java")));
        assert!(!filter.accepts(Path::new("Main.java.bak")));
        assert!(!filter.accepts(Path::new("Main.kt")));
        assert_eq!(filter.patterns(), &["*.java".to_string()]);
    }

    #[test]
    fn directory_names_are_ignored() {
        let filter = FileFilter::for_extensions(&["java"]).unwrap();
        assert!(!filter.accepts(Path::new("src.java/README")));
        assert!(!filter.accepts(Path::new("/")));
    }

    #[test]
    fn multiple_patterns() {
        let filter = FileFilter::new(&["*.h", "*.{cc,cpp}"]).unwrap();
        assert!(filter.accepts(Path::new("a.h")));
        assert!(filter.accepts(Path::new("a.cpp")));
        assert!(filter.accepts(Path::new("a.cc")));
        assert!(!filter.accepts(Path::new("a.c")));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = FileFilter::new(&["*.[java"]).unwrap_err();
        assert!(err.to_string().contains("*.[java"));
        let converted: VarScopeError = err.into();
        assert!(matches!(converted, VarScopeError::Config { .. }));
    }
}
