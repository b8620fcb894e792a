//! Output files and path bookkeeping for the pipeline.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};

/// Canonical file name every CSS-typed bundle asset collapses onto.
pub(crate) const MAIN_CSS: &str = "main.css";

/// One file-write obligation produced by a pipeline step.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Destination path of the file.
    pub path: Utf8PathBuf,
    /// Text content to be written.
    pub data: String,
}

/// Writes every output, creating parent directories as needed.
pub(crate) fn write_outputs(outputs: &[BuildOutput]) -> io::Result<()> {
    for output in outputs {
        if let Some(dir) = output.path.parent() {
            fs::create_dir_all(dir)?;
        }

        fs::write(&output.path, &output.data)?;
    }

    Ok(())
}

/// Content-type driven routing for bundle assets.
///
/// Anything that resolves to CSS is written to the canonical [`MAIN_CSS`]
/// name, so differently named CSS inputs collapse onto one output file.
/// Scripts keep their stem under the dist root; every other asset lands
/// under `assets/` with its original name and extension.
pub(crate) fn route_asset(name: &Utf8Path) -> Utf8PathBuf {
    let file = name.file_name().unwrap_or("asset");

    match name.extension() {
        Some("css") => Utf8PathBuf::from(MAIN_CSS),
        Some("js" | "mjs") => Utf8PathBuf::from(file).with_extension("js"),
        _ => Utf8Path::new("assets").join(file),
    }
}

/// Inserts the `.min` marker before the extension: `main.css` becomes
/// `main.min.css`.
pub(crate) fn min_sibling(path: &Utf8Path) -> Utf8PathBuf {
    match path.extension() {
        Some(ext) => path.with_extension(format!("min.{ext}")),
        None => path.with_extension("min"),
    }
}

/// Appends `.map` to a generated file's full name.
pub(crate) fn map_sibling(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}.map"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn css_assets_collapse_onto_the_canonical_name() {
        assert_eq!(route_asset(Utf8Path::new("main.css")), Utf8Path::new("main.css"));
        assert_eq!(route_asset(Utf8Path::new("theme.css")), Utf8Path::new("main.css"));

        // Two differently named CSS inputs map to the same output. This is
        // the intended collapse, not a collision to be fixed.
        assert_eq!(
            route_asset(Utf8Path::new("a.css")),
            route_asset(Utf8Path::new("b.css"))
        );
    }

    #[test]
    fn scripts_keep_their_name_at_the_root() {
        assert_eq!(route_asset(Utf8Path::new("app.js")), Utf8Path::new("app.js"));
        assert_eq!(route_asset(Utf8Path::new("app.mjs")), Utf8Path::new("app.js"));
    }

    #[test]
    fn other_assets_land_under_assets() {
        assert_eq!(
            route_asset(Utf8Path::new("logo.svg")),
            Utf8Path::new("assets/logo.svg")
        );
        assert_eq!(
            route_asset(Utf8Path::new("fonts/body.woff2")),
            Utf8Path::new("assets/body.woff2")
        );
    }

    #[test]
    fn min_marker_is_inserted_before_the_extension() {
        assert_eq!(
            min_sibling(Utf8Path::new("dist/main.css")),
            Utf8Path::new("dist/main.min.css")
        );
        assert_eq!(min_sibling(Utf8Path::new("main")), Utf8Path::new("main.min"));
    }

    #[test]
    fn map_name_is_appended_to_the_full_name() {
        assert_eq!(
            map_sibling(Utf8Path::new("dist/main.css")),
            Utf8Path::new("dist/main.css.map")
        );
        assert_eq!(
            map_sibling(Utf8Path::new("dist/main.min.css")),
            Utf8Path::new("dist/main.min.css.map")
        );
    }

    #[test]
    fn outputs_create_their_parent_directories() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();

        let outputs = [
            BuildOutput {
                path: root.join("dist/expanded/pages/home.css"),
                data: ".a{}".to_string(),
            },
            BuildOutput {
                path: root.join("dist/compressed/pages/home.css"),
                data: ".a{}".to_string(),
            },
        ];

        write_outputs(&outputs).unwrap();

        assert!(root.join("dist/expanded/pages/home.css").exists());
        assert!(root.join("dist/compressed/pages/home.css").exists());
    }
}
