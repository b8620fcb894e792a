//! Compilation core wrapping the external SCSS compiler.
//!
//! This module uses [`grass`] under the hood. Source maps are produced at
//! the CSS layer with [`lightningcss`], since the SCSS compiler itself does
//! not emit them.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{CssError, StyleError};

/// Output style of a compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStyle {
    /// Human-readable output.
    #[default]
    Expanded,
    /// Whitespace-reduced output.
    Compressed,
}

impl OutputStyle {
    /// Directory name this style's artifacts are rooted under.
    pub fn as_dir(self) -> &'static str {
        match self {
            OutputStyle::Expanded => "expanded",
            OutputStyle::Compressed => "compressed",
        }
    }

    fn to_grass(self) -> grass::OutputStyle {
        match self {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        }
    }
}

/// One requested pass of the compiler over a single source file.
#[derive(Debug, Clone)]
pub struct CompilationTask {
    /// The stylesheet to compile.
    pub source: Utf8PathBuf,
    /// Requested output style.
    pub style: OutputStyle,
    /// Whether to emit a source map alongside the CSS.
    pub source_map: bool,
}

/// The artifacts produced by one successful pass.
///
/// A task yields exactly one of these or an error, never both.
#[derive(Debug, Clone)]
pub struct CompilationResult {
    /// Compiled CSS text.
    pub css: String,
    /// Serialized source map, when the task asked for one.
    pub map: Option<String>,
}

/// Compiles a single stylesheet, resolving imports through `load_paths`.
pub fn compile(
    task: &CompilationTask,
    load_paths: &[Utf8PathBuf],
) -> Result<CompilationResult, StyleError> {
    let mut options = grass::Options::default().style(task.style.to_grass());
    for path in load_paths {
        options = options.load_path(path.as_std_path());
    }

    let css = grass::from_path(&task.source, &options).map_err(|source| StyleError::Sass {
        path: task.source.clone(),
        source,
    })?;

    if task.source_map {
        let (css, map) = emit_map(&task.source, &css)?;
        Ok(CompilationResult {
            css,
            map: Some(map),
        })
    } else {
        Ok(CompilationResult { css, map: None })
    }
}

/// Compiles a stylesheet from a string, without source maps.
pub fn compile_str(source: &str, style: OutputStyle) -> Result<String, StyleError> {
    let options = grass::Options::default().style(style.to_grass());

    grass::from_string(source.to_owned(), &options).map_err(|source| StyleError::Sass {
        path: Utf8PathBuf::from("<string>"),
        source,
    })
}

/// Reprints compiled CSS through the printer so that a source map can be
/// collected, naming `source` as the originating file.
fn emit_map(source: &Utf8Path, css: &str) -> Result<(String, String), StyleError> {
    use lightningcss::printer::PrinterOptions;
    use lightningcss::stylesheet::{ParserOptions, StyleSheet};
    use parcel_sourcemap::SourceMap;

    let stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: source.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(CssError::from_css)?;

    let mut map = SourceMap::new("/");
    map.add_source(source.as_str());
    map.set_source_content(0, css)
        .map_err(CssError::from_map)?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            source_map: Some(&mut map),
            ..PrinterOptions::default()
        })
        .map_err(CssError::from_css)?;

    let json = map.to_json(None).map_err(CssError::from_map)?;

    Ok((printed.code, json))
}
