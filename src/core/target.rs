//! Stylesheet syntaxes, conversion targets and import paths.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::path::is_directory_like;
use crate::util::fs::FileSystem;

/// Extension given to every compiled output file.
pub const OUTPUT_EXTENSION: &str = "css";

/// Stylesheet syntax, derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleSyntax {
    /// `.scss`
    Scss,
    /// `.sass` (indented syntax)
    Sass,
    /// `.css`
    Css,
}

impl StyleSyntax {
    /// Detect the syntax from a path's extension, ignoring case.
    ///
    /// The extension is whatever follows the last `.` of the file name, so a
    /// bare `.scss` counts as an SCSS file.
    pub fn from_path(path: &Path) -> Option<StyleSyntax> {
        let name = path.file_name()?.to_str()?;
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "scss" => Some(StyleSyntax::Scss),
            "sass" => Some(StyleSyntax::Sass),
            "css" => Some(StyleSyntax::Css),
            _ => None,
        }
    }

    /// Get the canonical extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleSyntax::Scss => "scss",
            StyleSyntax::Sass => "sass",
            StyleSyntax::Css => "css",
        }
    }
}

impl fmt::Display for StyleSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where compiled output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionTarget {
    /// Outputs mirror the source tree beneath this directory.
    Directory(PathBuf),
    /// Every output is written to exactly this file.
    File(PathBuf),
}

impl ConversionTarget {
    /// Classify a destination, existing or not.
    pub fn classify(fs: &dyn FileSystem, path: &Path) -> Result<ConversionTarget> {
        if is_directory_like(fs, path)? {
            Ok(ConversionTarget::Directory(path.to_path_buf()))
        } else {
            Ok(ConversionTarget::File(path.to_path_buf()))
        }
    }

    /// The target path.
    pub fn path(&self) -> &Path {
        match self {
            ConversionTarget::Directory(p) | ConversionTarget::File(p) => p,
        }
    }

    /// Whether outputs mirror the source tree.
    pub fn is_directory(&self) -> bool {
        matches!(self, ConversionTarget::Directory(_))
    }
}

/// Ordered directories handed to the compiler for `@import`/`@use` lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPaths(Vec<PathBuf>);

impl ImportPaths {
    /// Create an empty set.
    pub fn new() -> Self {
        ImportPaths(Vec::new())
    }

    /// Append directories not already present.
    pub fn extend_unique<I>(&mut self, paths: I)
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        for path in paths {
            let path = path.into();
            if !self.0.contains(&path) {
                self.0.push(path);
            }
        }
    }

    /// The directories, in order.
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ImportPaths {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        ImportPaths(iter.into_iter().map(Into::into).collect())
    }
}
