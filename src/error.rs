use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Location of the offending construct inside a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Path of the file the diagnostic points into.
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A failure raised by the CSS layer (parsing, minification or printing),
/// detached from the borrowed source text so it can outlive it.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct CssError {
    /// Human-readable message.
    pub message: String,
    /// Structured location, when the underlying diagnostic carries one.
    pub location: Option<SourceLocation>,
}

impl CssError {
    pub(crate) fn from_css<T: std::fmt::Display>(err: lightningcss::error::Error<T>) -> Self {
        CssError {
            message: err.kind.to_string(),
            location: err.loc.map(|loc| SourceLocation {
                file: loc.filename,
                line: loc.line,
                column: loc.column,
            }),
        }
    }

    pub(crate) fn from_map(err: parcel_sourcemap::SourceMapError) -> Self {
        CssError {
            message: err.to_string(),
            location: None,
        }
    }
}

/// Errors that can occur while compiling stylesheets.
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sass compilation error in '{path}':\n{source}")]
    Sass {
        path: Utf8PathBuf,
        source: Box<grass::Error>,
    },

    #[error("CSS error: {0}")]
    Css(#[from] CssError),

    #[error("Couldn't compile glob pattern.\n{0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Couldn't run glob.\n{0}")]
    Glob(#[from] glob::GlobError),

    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),
}

impl StyleError {
    /// Path of the stylesheet the failure originated from, when known.
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            StyleError::Sass { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Structured source location, when the diagnostic carries one.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            StyleError::Css(err) => err.location.as_ref(),
            _ => None,
        }
    }
}

/// Errors that can fail a bundle run.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Style compilation failed:\n{0}")]
    Style(#[from] StyleError),

    #[error("Minification failed:\n{0}")]
    Minify(#[from] CssError),

    #[error("Source map serialization failed:\n{0}")]
    SourceMap(#[from] serde_json::Error),
}
