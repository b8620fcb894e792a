//! Bundle pipeline: one entry stylesheet is resolved into a single
//! canonical CSS artifact, then minified as a strictly subsequent step.

use camino::{Utf8Path, Utf8PathBuf};
use console::style;

use crate::compile::{CompilationTask, OutputStyle, compile};
use crate::error::BundleError;
use crate::minify::{MinificationJob, MinifyLevel, minify_file, name_generated_file};
use crate::output::{BuildOutput, map_sibling, min_sibling, route_asset, write_outputs};
use crate::report::report;

/// Bundles a single entry stylesheet into `main.css` (+ source map) and a
/// post-build `main.min.css` variant.
///
/// The minification step starts only once the primary artifact exists on
/// disk; a primary failure suppresses it entirely.
#[derive(Debug, Clone)]
pub struct Bundle {
    entry: Utf8PathBuf,
    dist: Utf8PathBuf,
    level: MinifyLevel,
    load_paths: Vec<Utf8PathBuf>,
    clear: bool,
}

/// Artifacts of one successful bundle run.
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// The canonical unminified stylesheet.
    pub primary: Utf8PathBuf,
    /// The minified variant.
    pub minified: Utf8PathBuf,
}

impl Bundle {
    pub fn config() -> BundleConfig {
        BundleConfig::new()
    }

    /// Runs the primary build, then the post-build minification step.
    pub fn run(&self) -> Result<BundleReport, BundleError> {
        crate::utils::init_logging();

        eprintln!(
            "Running {} in {} mode.",
            style("stylec").red(),
            style("bundle").blue()
        );

        let primary = match self.build_primary() {
            Ok(path) => path,
            Err(err) => {
                report("build process", &err);
                return Err(err);
            }
        };

        let minified = match self.minify_primary(&primary) {
            Ok(path) => path,
            Err(err) => {
                report("create minified css", &err);
                return Err(err);
            }
        };

        tracing::info!("build process completed successfully");

        Ok(BundleReport { primary, minified })
    }

    /// Watches the entry's directory tree, rebuilding on changes.
    #[cfg(feature = "live")]
    pub fn watch(&self) -> anyhow::Result<()> {
        let mut roots = vec![
            self.entry
                .parent()
                .map(Utf8Path::to_path_buf)
                .unwrap_or_else(|| Utf8PathBuf::from(".")),
        ];
        roots.extend(self.load_paths.iter().cloned());

        let this = self.clone();

        crate::watch::watch(&roots, self.dist.clone(), move || this.run().is_ok())
    }

    /// Resolves the entry into one stylesheet and persists it together with
    /// its source map under the canonical name.
    fn build_primary(&self) -> Result<Utf8PathBuf, BundleError> {
        if self.clear {
            crate::utils::clear_dist(&self.dist)?;
        }

        let task = CompilationTask {
            source: self.entry.clone(),
            style: OutputStyle::Expanded,
            source_map: true,
        };
        let result = compile(&task, &self.load_paths)?;

        let css_path = self.dist.join(route_asset(&self.entry.with_extension("css")));
        let map_path = map_sibling(&css_path);

        let mut css = result.css;
        let mut outputs = Vec::with_capacity(2);

        if let Some(map) = result.map {
            let map = name_generated_file(&map, file_name(&css_path))?;
            css.push_str(&format!(
                "\n/*# sourceMappingURL={} */\n",
                file_name(&map_path)
            ));
            outputs.push(BuildOutput {
                path: map_path,
                data: map,
            });
        }

        outputs.insert(
            0,
            BuildOutput {
                path: css_path.clone(),
                data: css,
            },
        );
        write_outputs(&outputs)?;

        tracing::info!("compiled {} -> {}", self.entry, css_path);

        Ok(css_path)
    }

    /// Post-build step. Reads the canonical artifact back from disk, so the
    /// ordering dependency is on the persisted file, not in-memory state.
    fn minify_primary(&self, primary: &Utf8Path) -> Result<Utf8PathBuf, BundleError> {
        let job = MinificationJob {
            input: primary.to_path_buf(),
            level: self.level,
        };
        let minified = minify_file(&job)?;

        let min_path = min_sibling(primary);
        let map_path = map_sibling(&min_path);

        let map = name_generated_file(&minified.map, file_name(&min_path))?;

        let mut css = minified.css;
        css.push_str(&format!(
            "\n/*# sourceMappingURL={} */\n",
            file_name(&map_path)
        ));

        write_outputs(&[
            BuildOutput {
                path: min_path.clone(),
                data: css,
            },
            BuildOutput {
                path: map_path,
                data: map,
            },
        ])?;

        tracing::info!("generated minified variant {}", min_path);

        Ok(min_path)
    }
}

fn file_name(path: &Utf8Path) -> &str {
    path.file_name().unwrap_or(path.as_str())
}

/// A builder for [`Bundle`].
#[derive(Debug)]
pub struct BundleConfig {
    entry: Utf8PathBuf,
    dist: Utf8PathBuf,
    level: MinifyLevel,
    load_paths: Vec<Utf8PathBuf>,
    clear: bool,
}

impl BundleConfig {
    fn new() -> Self {
        Self {
            entry: Utf8PathBuf::from("sass/main.scss"),
            dist: Utf8PathBuf::from("dist"),
            level: MinifyLevel::default(),
            load_paths: Vec::new(),
            clear: true,
        }
    }

    /// The entry stylesheet all imports are resolved from.
    pub fn entry(mut self, entry: impl Into<Utf8PathBuf>) -> Self {
        self.entry = entry.into();
        self
    }

    /// Output directory for the bundle artifacts.
    pub fn dist(mut self, dist: impl Into<Utf8PathBuf>) -> Self {
        self.dist = dist.into();
        self
    }

    /// Optimization level for the post-build minification step.
    pub fn minify_level(mut self, level: MinifyLevel) -> Self {
        self.level = level;
        self
    }

    /// Additional directory searched when resolving imports.
    pub fn load_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.load_paths.push(path.into());
        self
    }

    /// Leaves existing files in the output directory in place.
    pub fn keep_dist(mut self) -> Self {
        self.clear = false;
        self
    }

    pub fn finish(self) -> Bundle {
        Bundle {
            entry: self.entry,
            dist: self.dist,
            level: self.level,
            load_paths: self.load_paths,
            clear: self.clear,
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self::new()
    }
}
