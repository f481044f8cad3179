//! HTTP front end for ragjudge.
//!
//! A lightweight sync server (via `tiny_http`) that serves:
//! - the single-page evaluation UI (`GET /`)
//! - `POST /evaluate`, running the full RAG vs Non-RAG pipeline
//! - small JSON endpoints for health and the effective configuration
//!
//! Launched via `ragjudge serve` (default: `http://127.0.0.1:5000`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::config::RagJudgeConfig;
use crate::evaluation::pipeline::Pipeline;

pub use frontend::INDEX_HTML;

/// Everything a request handler can reach.
pub struct AppState {
    pub pipeline: Pipeline,
    pub config: RagJudgeConfig,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: RagJudgeConfig) -> Self {
        Self { pipeline, config }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Bind the HTTP listener. Port 0 picks a free port.
pub fn bind(addr: &str) -> Result<Server> {
    Server::http(addr).map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))
}

/// Start the server on `addr` and block serving requests.
///
/// Opens the page in the default browser when `open` is set (best-effort).
pub fn serve(state: AppState, addr: &str, open: bool) -> Result<()> {
    let server = bind(addr)?;

    println!("ragjudge running at http://{addr}");
    println!(
        "{} documents loaded, model {}",
        state.pipeline.document_count(),
        state.config.llm.model
    );
    println!("Press Ctrl+C to stop.\n");

    if open {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    run(&server, &state);
    Ok(())
}

/// Handle requests sequentially until the server shuts down.
///
/// Requests are slow (three model calls for an evaluation) but the UI is
/// single-user; a failing request never takes the loop down.
pub fn run(server: &Server, state: &AppState) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            if let Err(e) = request.as_reader().read_to_string(&mut buf) {
                tracing::warn!(error = %e, %url, "failed to read request body");
            }
            Some(buf)
        } else {
            None
        };

        let response = match dispatch(state, &method, &url, body.as_deref()) {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), %method, %url, "request failed");
                json_error(StatusCode(500), &format!("{e:#}"))
            }
        };
        let status = response.status_code().0;

        if let Err(e) = request.respond(response) {
            tracing::warn!(error = %e, %url, "failed to send response");
        }

        // Brief access log
        tracing::info!(
            target: "ragjudge::access",
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub fn dispatch(
    state: &AppState,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // Evaluation
        (&Method::Post, "/evaluate") => api::post_evaluate(&state.pipeline, body.unwrap_or("")),

        // API
        (&Method::Get, "/api/health") => api::get_health(state),
        (&Method::Get, "/api/config") => api::get_config(&state.config),

        // 404
        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> Response<Cursor<Vec<u8>>> {
    json_error(StatusCode(404), "not found")
}

/// `{"error": message}` with the given status.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(status)
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
