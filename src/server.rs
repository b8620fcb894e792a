//! Development HTTP server over the dist directory.

use std::net::SocketAddr;
use std::thread;

use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use camino::{Utf8Path, Utf8PathBuf};
use console::style;
use tower_http::services::ServeDir;
use tracing::info;

/// Paths that must never be served, no matter what lands in dist.
const DENIED: &[&str] = &[".env", "secret-folder", "config.js"];

pub(crate) fn start(dist: Utf8PathBuf) -> thread::JoinHandle<Result<(), anyhow::Error>> {
    let port = 8080;

    info!(url = %style(format!("http://localhost:{port}/")).yellow(), "starting a HTTP server");

    thread::spawn(move || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(serve(port, dist))
    })
}

async fn serve(port: u16, dist: Utf8PathBuf) -> Result<(), anyhow::Error> {
    let address = SocketAddr::from(([127, 0, 0, 1], port));
    let address = tokio::net::TcpListener::bind(address).await?;

    let router = Router::new()
        .fallback_service(ServeDir::new(dist.as_std_path()))
        .layer(middleware::from_fn(refuse_denied));

    axum::serve(address, router).await?;

    Ok(())
}

/// Refuses requests touching the deny list before they reach the filesystem.
async fn refuse_denied(request: Request, next: Next) -> Response {
    if is_denied(request.uri().path()) {
        return StatusCode::FORBIDDEN.into_response();
    }

    next.run(request).await
}

fn is_denied(path: &str) -> bool {
    Utf8Path::new(path)
        .components()
        .any(|component| DENIED.contains(&component.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_paths_are_refused() {
        assert!(is_denied("/.env"));
        assert!(is_denied("/config.js"));
        assert!(is_denied("/secret-folder/key.pem"));
        assert!(is_denied("/nested/secret-folder/key.pem"));
    }

    #[test]
    fn regular_assets_are_served() {
        assert!(!is_denied("/main.css"));
        assert!(!is_denied("/main.min.css"));
        assert!(!is_denied("/assets/logo.svg"));
        assert!(!is_denied("/environment/index.html"));
    }
}
