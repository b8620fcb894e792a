//! CSS minification built on [`lightningcss`].
//!
//! Minification always runs against a persisted artifact: the job reads its
//! input back from disk, so it can only ever observe what an earlier phase
//! actually managed to write.

use std::fs;

use camino::Utf8PathBuf;
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use parcel_sourcemap::SourceMap;
use serde::{Deserialize, Serialize};

use crate::error::{BundleError, CssError};

/// How hard the minifier squeezes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinifyLevel {
    /// Compact printing only.
    Safe,
    /// Structural optimizations on top of compact printing.
    #[default]
    Aggressive,
}

/// A single minifier invocation over a persisted CSS artifact.
#[derive(Debug, Clone)]
pub struct MinificationJob {
    /// The CSS file to read and minify.
    pub input: Utf8PathBuf,
    /// Optimization level.
    pub level: MinifyLevel,
}

/// Minified stylesheet plus its source map.
#[derive(Debug, Clone)]
pub struct Minified {
    /// Minified CSS text.
    pub css: String,
    /// Serialized source map for the minified text.
    pub map: String,
}

/// Reads the job's input from disk and minifies it.
pub fn minify_file(job: &MinificationJob) -> Result<Minified, BundleError> {
    let css = fs::read_to_string(&job.input)?;
    let name = job.input.file_name().unwrap_or(job.input.as_str());

    Ok(minify(name, &css, job.level)?)
}

/// Minifies a CSS string, mapping generated positions back to `source_name`.
pub fn minify(source_name: &str, css: &str, level: MinifyLevel) -> Result<Minified, CssError> {
    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: source_name.to_owned(),
            ..ParserOptions::default()
        },
    )
    .map_err(CssError::from_css)?;

    if level == MinifyLevel::Aggressive {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(CssError::from_css)?;
    }

    let mut map = SourceMap::new("/");
    map.add_source(source_name);
    map.set_source_content(0, css).map_err(CssError::from_map)?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: Some(&mut map),
            ..PrinterOptions::default()
        })
        .map_err(CssError::from_css)?;

    let map = map.to_json(None).map_err(CssError::from_map)?;

    Ok(Minified {
        css: printed.code,
        map,
    })
}

/// Stamps the generated file's name into a serialized source map.
pub(crate) fn name_generated_file(map: &str, file: &str) -> Result<String, serde_json::Error> {
    let mut value: serde_json::Value = serde_json::from_str(map)?;

    if let Some(object) = value.as_object_mut() {
        object.insert(
            "file".to_owned(),
            serde_json::Value::String(file.to_owned()),
        );
    }

    serde_json::to_string(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minified_is_no_larger_and_keeps_rules() {
        let css = ".a {\n  color: red;\n}\n\n.b {\n  color: blue;\n}\n";

        let out = minify("main.css", css, MinifyLevel::Aggressive).unwrap();

        assert!(out.css.len() <= css.len());
        assert!(out.css.contains(".a"));
        assert!(out.css.contains(".b"));
        assert!(!out.css.contains('\n'));
    }

    #[test]
    fn map_names_the_input() {
        let out = minify("main.css", ".a { color: red; }", MinifyLevel::Safe).unwrap();

        let map: serde_json::Value = serde_json::from_str(&out.map).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["sources"][0], "main.css");
    }

    #[test]
    fn invalid_css_is_refused() {
        let err = minify("main.css", "}", MinifyLevel::Safe).unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn generated_file_is_stamped() {
        let map = r#"{"version":3,"sources":["main.css"],"names":[],"mappings":"AAAA"}"#;

        let stamped = name_generated_file(map, "main.min.css").unwrap();

        let value: serde_json::Value = serde_json::from_str(&stamped).unwrap();
        assert_eq!(value["file"], "main.min.css");
        assert_eq!(value["sources"][0], "main.css");
    }

    #[test]
    fn job_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        let input = root.join("main.css");
        std::fs::write(&input, ".a {\n  margin: 0;\n}\n").unwrap();

        let job = MinificationJob {
            input,
            level: MinifyLevel::Aggressive,
        };
        let out = minify_file(&job).unwrap();

        assert!(out.css.contains(".a"));
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let job = MinificationJob {
            input: Utf8PathBuf::from("does/not/exist.css"),
            level: MinifyLevel::Safe,
        };

        assert!(matches!(
            minify_file(&job),
            Err(BundleError::Io(_))
        ));
    }
}
