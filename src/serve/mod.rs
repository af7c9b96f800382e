//! Development server with live reload.
//!
//! Serves the output tree over HTTP, injects the reload client into HTML
//! pages and runs the watch actors until Ctrl+C.

mod lifecycle;
mod path;
mod response;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};
use tokio::sync::mpsc::UnboundedReceiver;

use self::response::Responder;
use crate::actor::Coordinator;
use crate::actor::messages::WsMsg;
use crate::config::PipelineConfig;
use crate::core::{is_shutdown, register_server};
use crate::embed::serve::HOTRELOAD_URL;
use crate::reload::ReloadHandle;
use crate::{debug, log};

/// Request handler threads
const REQUEST_THREADS: usize = 4;

/// Serve until Ctrl+C.
///
/// Bind errors for either server are fatal.
pub fn run(
    config: Arc<PipelineConfig>,
    reload: ReloadHandle,
    ws_rx: UnboundedReceiver<WsMsg>,
) -> Result<()> {
    let coordinator = Coordinator::new(Arc::clone(&config), reload, ws_rx)?;
    let responder = Responder {
        ws_port: coordinator.ws_port(),
        cors: config.serve.cors,
    };
    debug!("hotreload"; "ws://{}:{}", config.serve.interface, responder.ws_port);

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);
    log!("serve"; "http://{}", addr);

    let actors = lifecycle::spawn_actors(coordinator, shutdown_rx)?;
    run_request_loop(&server, &config, responder)?;
    lifecycle::wait_for_shutdown(actors);
    Ok(())
}

fn run_request_loop(server: &Server, config: &Arc<PipelineConfig>, responder: Responder) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let config = Arc::clone(config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, responder) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

fn handle_request(request: Request, config: &PipelineConfig, responder: Responder) -> Result<()> {
    if is_shutdown() {
        return responder.unavailable(request);
    }

    if request.url() == HOTRELOAD_URL {
        return responder.hotreload_js(request);
    }

    match path::resolve_path(request.url(), config.output_dir()) {
        Some(file) => responder.file(request, &file),
        None => {
            debug!("serve"; "404 {}", request.url());
            responder.not_found(request, config.output_dir())
        }
    }
}
