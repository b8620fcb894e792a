//! Dual-style compiler: every matched stylesheet is compiled twice, once
//! per output style, into two sibling directory trees.

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::compile::{CompilationResult, CompilationTask, OutputStyle, compile};
use crate::error::StyleError;
use crate::output::{BuildOutput, write_outputs};
use crate::report::report;

/// Compiles a set of SCSS sources into expanded and compressed CSS trees.
///
/// A failing source is reported and skipped without aborting the rest of
/// the run; the two passes for one file always run in order (expanded
/// before compressed) while distinct files may compile in parallel.
#[derive(Debug, Clone)]
pub struct Styles {
    pattern: String,
    base: Utf8PathBuf,
    dist: Utf8PathBuf,
    load_paths: Vec<Utf8PathBuf>,
}

/// Summary of one style-compiler run.
#[derive(Debug, Default)]
pub struct StyleReport {
    /// Files written, as absolute destination paths.
    pub written: Vec<Utf8PathBuf>,
    /// Number of sources that failed and were skipped.
    pub failures: usize,
}

impl Styles {
    pub fn config() -> StylesConfig {
        StylesConfig::new()
    }

    /// Runs one full compilation pass over the matched sources.
    pub fn run(&self) -> Result<StyleReport, StyleError> {
        crate::utils::init_logging();

        eprintln!(
            "Running {} in {} mode.",
            style("stylec").red(),
            style("styles").blue()
        );

        let s = Instant::now();
        let sources = self.sources()?;

        let bar = ProgressBar::new(sources.len() as u64).with_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Error setting progress bar template")
                .progress_chars("#>-"),
        );

        let results: Vec<(Vec<Utf8PathBuf>, usize)> = sources
            .par_iter()
            .map(|source| {
                bar.set_message(source.to_string());
                let outcome = self.compile_both(source);
                bar.inc(1);
                outcome
            })
            .collect();

        bar.finish_with_message(format!("Compiled styles {}", crate::utils::as_overhead(s)));

        let mut summary = StyleReport::default();
        for (written, failures) in results {
            summary.written.extend(written);
            summary.failures += failures;
        }

        Ok(summary)
    }

    /// Watches the source tree, recompiling on changes.
    #[cfg(feature = "live")]
    pub fn watch(&self) -> anyhow::Result<()> {
        let this = self.clone();

        crate::watch::watch(&[self.base.clone()], self.dist.clone(), move || {
            match this.run() {
                Ok(_) => true,
                Err(err) => {
                    report("styles", &err);
                    false
                }
            }
        })
    }

    /// Both passes for one file, expanded first. A file whose pass fails is
    /// dropped from the run with a single reported failure; the remaining
    /// pass would only repeat the same diagnostic.
    fn compile_both(&self, source: &Utf8Path) -> (Vec<Utf8PathBuf>, usize) {
        let mut written = Vec::new();

        for style in [OutputStyle::Expanded, OutputStyle::Compressed] {
            match self.compile_one(source, style) {
                Ok(path) => written.push(path),
                Err(err) => {
                    report("styles", &err);
                    return (written, 1);
                }
            }
        }

        (written, 0)
    }

    fn compile_one(&self, source: &Utf8Path, style: OutputStyle) -> Result<Utf8PathBuf, StyleError> {
        let task = CompilationTask {
            source: source.to_owned(),
            style,
            source_map: false,
        };
        let CompilationResult { css, .. } = compile(&task, &self.load_paths)?;

        let path = self.dist.join(dest_path(source, &self.base, style));
        write_outputs(&[BuildOutput {
            path: path.clone(),
            data: css,
        }])?;

        tracing::debug!("compiled {} -> {}", source, path);

        Ok(path)
    }

    fn sources(&self) -> Result<Vec<Utf8PathBuf>, StyleError> {
        let mut acc = Vec::new();

        for entry in glob::glob(&self.pattern)? {
            acc.push(Utf8PathBuf::try_from(entry?)?);
        }

        Ok(acc)
    }
}

/// Maps a source path onto its destination below the per-style root,
/// preserving the path relative to the source base and normalizing the
/// extension to `css`.
fn dest_path(source: &Utf8Path, base: &Utf8Path, style: OutputStyle) -> Utf8PathBuf {
    let relative = source.strip_prefix(base).unwrap_or(source);

    Utf8Path::new(style.as_dir())
        .join(relative)
        .with_extension("css")
}

/// A builder for [`Styles`].
#[derive(Debug)]
pub struct StylesConfig {
    pattern: String,
    base: Utf8PathBuf,
    dist: Utf8PathBuf,
    load_paths: Vec<Utf8PathBuf>,
}

impl StylesConfig {
    fn new() -> Self {
        Self {
            pattern: "styles/**/[!_]*.scss".to_string(),
            base: Utf8PathBuf::from("styles"),
            dist: Utf8PathBuf::from("dist"),
            load_paths: Vec::new(),
        }
    }

    /// Glob pattern selecting the source stylesheets.
    pub fn source_glob(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Base directory the destination tree mirrors sources against.
    pub fn source_base(mut self, base: impl Into<Utf8PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    /// Root output directory holding the per-style trees.
    pub fn dist(mut self, dist: impl Into<Utf8PathBuf>) -> Self {
        self.dist = dist.into();
        self
    }

    /// Additional directory searched when resolving imports.
    pub fn load_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.load_paths.push(path.into());
        self
    }

    pub fn finish(self) -> Styles {
        Styles {
            pattern: self.pattern,
            base: self.base,
            dist: self.dist,
            load_paths: self.load_paths,
        }
    }
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self::new()
    }
}
