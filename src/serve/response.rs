//! HTTP response handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars, script_tag};
use crate::utils::mime::{self, types};

/// Per-server response settings.
#[derive(Debug, Clone, Copy)]
pub struct Responder {
    pub ws_port: u16,
    pub cors: bool,
}

impl Responder {
    /// Serve a file, injecting the reload client into HTML.
    pub fn file(&self, request: Request, path: &Path) -> Result<()> {
        let content_type = mime::from_path(path);
        if is_head_request(&request) {
            return self.send(request, 200, content_type, Vec::new());
        }

        let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let body = if content_type == types::HTML {
            inject_hotreload(&body)
        } else {
            body
        };
        self.send(request, 200, content_type, body)
    }

    pub fn hotreload_js(&self, request: Request) -> Result<()> {
        let body = HOTRELOAD_JS.render(&HotreloadVars {
            ws_port: self.ws_port,
        });
        self.send(request, 200, types::JAVASCRIPT, body.into_bytes())
    }

    /// Custom `404.html` from the output root when present.
    pub fn not_found(&self, request: Request, output: &Path) -> Result<()> {
        if let Ok(body) = fs::read(output.join("404.html")) {
            return self.send(request, 404, types::HTML, inject_hotreload(&body));
        }
        self.send(request, 404, types::PLAIN, b"404 Not Found".to_vec())
    }

    /// Server shutting down.
    pub fn unavailable(&self, request: Request) -> Result<()> {
        self.send(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
    }

    fn send(&self, request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
        let body = if is_head_request(&request) { Vec::new() } else { body };
        let mut response = Response::from_data(body)
            .with_status_code(StatusCode(status))
            .with_header(header("Content-Type", content_type)?)
            .with_header(header("Cache-Control", "no-cache")?);
        if self.cors {
            response = response.with_header(header("Access-Control-Allow-Origin", "*")?);
        }
        request.respond(response)?;
        Ok(())
    }
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}

/// Insert the reload client before the last `</body>`, or append it.
fn inject_hotreload(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = script_tag();
    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script.as_bytes());
    result.extend_from_slice(&content[pos..]);
    result
}
