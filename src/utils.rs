use std::fmt::Display;
use std::fs;
use std::time::Instant;

use camino::Utf8Path;
use console::Style;

const ANSI_BLUE: Style = Style::new().blue();

pub(crate) fn as_overhead(s: Instant) -> impl Display {
    let e = Instant::now();
    let f = format!("(+{}ms)", e.duration_since(s).as_millis());
    ANSI_BLUE.apply_to(f)
}

/// Delete and recreate a dist directory.
pub(crate) fn clear_dist(dist: &Utf8Path) -> std::io::Result<()> {
    let s = Instant::now();

    if fs::metadata(dist).is_ok() {
        fs::remove_dir_all(dist)?;
    }

    fs::create_dir_all(dist)?;

    eprintln!("Cleaned the dist directory {}", as_overhead(s));

    Ok(())
}

/// Installs the global tracing subscriber. Safe to call more than once.
pub(crate) fn init_logging() {
    #[cfg(feature = "logging")]
    {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let indicatif = tracing_indicatif::IndicatifLayer::new();

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(indicatif.get_stderr_writer()))
            .with(indicatif)
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn clear_dist_recreates_an_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        let dist = root.join("dist");

        std::fs::create_dir_all(dist.join("stale")).unwrap();
        std::fs::write(dist.join("stale/old.css"), ".old{}").unwrap();

        clear_dist(&dist).unwrap();

        assert!(dist.exists());
        assert!(!dist.join("stale").exists());
    }

    #[test]
    fn clear_dist_handles_a_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();

        clear_dist(&root.join("dist")).unwrap();
        assert!(root.join("dist").exists());
    }
}
