//! Development server with live reload support.
//!
//! ```text
//! ┌────────────┐  GET   ┌──────────────┐ miss ┌─────────────┐
//! │  browser   │───────▶│ output.dir   │─────▶│ serve.root  │
//! └────────────┘        └──────────────┘      └─────────────┘
//!       ▲ ws://…:ws_port
//!       └── WsActor ◀── BuildActor ◀── FsActor (when serve.hot)
//! ```

mod content;
mod lifecycle;
mod path;
mod response;

use crate::{
    actor::messages::WsMsg,
    config::BuildConfig,
    embed::serve::HOTRELOAD_PATH,
    log,
};
use anyhow::{Context, Result, anyhow};
use crossbeam::channel;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use tiny_http::{Request, Server};
use tokio::sync::mpsc;

const REQUEST_THREADS: usize = 4;
const WS_CHANNEL_BUFFER: usize = 32;

/// Run `wasp serve` until Ctrl+C.
pub fn serve(config: Arc<BuildConfig>) -> Result<()> {
    config.validate_serve()?;

    // Reload server first: a taken port fails before anything is built
    let reload = if config.serve.hot {
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(WS_CHANNEL_BUFFER);
        let port = crate::reload::server::start_ws_server(
            config.serve.interface,
            config.serve.ws_port,
            ws_tx.clone(),
        )?;
        crate::debug!("hotreload"; "ws://{}:{}", config.serve.interface, port);
        Some((ws_tx, ws_rx, port))
    } else {
        None
    };

    let server = DevServer::bind(&config, reload.as_ref().map(|(_, _, port)| *port))?;
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(server.server(), shutdown_tx);

    let actors = match reload {
        Some((ws_tx, ws_rx, _)) => Some(lifecycle::spawn_actors(
            Arc::clone(&config),
            ws_tx,
            ws_rx,
            shutdown_rx,
        )),
        None => {
            // no watcher: build once, then just serve
            if let Err(e) = crate::cli::build::build_project(&config) {
                log!("error"; "{:#}", e);
            }
            None
        }
    };

    let handle = server.spawn()?;
    log!("serve"; "http://{}", handle.addr());
    handle.wait();
    lifecycle::wait_for_shutdown(actors);
    Ok(())
}

/// What a request handler needs to know.
struct ServeContext {
    output_dir: PathBuf,
    static_root: PathBuf,
    /// Reload port when hot reload is on
    ws_port: Option<u16>,
}

/// HTTP server bound to `serve.interface:serve.port`, not yet accepting.
pub struct DevServer {
    server: Arc<Server>,
    addr: SocketAddr,
    ctx: Arc<ServeContext>,
}

/// Whether a spawned server still answers requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Serving,
}

/// Running server. Dropping it stops the server.
pub struct ServerHandle {
    server: Option<Arc<Server>>,
    addr: SocketAddr,
    thread: Option<JoinHandle<()>>,
    state: ServerState,
}

impl DevServer {
    /// Bind the configured address exactly. A port in use is an error.
    pub fn bind(config: &BuildConfig, ws_port: Option<u16>) -> Result<Self> {
        let addr = SocketAddr::new(config.serve.interface, config.serve.port);
        let server = Server::http(addr).map_err(|e| anyhow!("Failed to bind {addr}: {e}"))?;
        // port 0 binds an ephemeral port
        let addr = server.server_addr().to_ip().unwrap_or(addr);

        Ok(Self {
            server: Arc::new(server),
            addr,
            ctx: Arc::new(ServeContext {
                output_dir: config.output.dir.clone(),
                static_root: config.serve.root.clone(),
                ws_port,
            }),
        })
    }

    pub fn server(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Start the request loop on its own thread.
    pub fn spawn(self) -> Result<ServerHandle> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(REQUEST_THREADS)
            .thread_name(|i| format!("wasp-http-{i}"))
            .build()
            .context("failed to create request thread pool")?;

        let server = Arc::clone(&self.server);
        let ctx = self.ctx;
        let thread = std::thread::Builder::new()
            .name("wasp-http".into())
            .spawn(move || {
                for request in server.incoming_requests() {
                    let ctx = Arc::clone(&ctx);
                    pool.spawn(move || {
                        if let Err(e) = handle_request(request, &ctx) {
                            log!("serve"; "request error: {e}");
                        }
                    });
                }
            })
            .context("failed to spawn server thread")?;

        Ok(ServerHandle {
            server: Some(self.server),
            addr: self.addr,
            thread: Some(thread),
            state: ServerState::Serving,
        })
    }
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Unblock the listener, join the request loop and release the port.
    pub fn stop(&mut self) {
        if let Some(server) = &self.server {
            server.unblock();
        }
        self.join();
    }

    /// Block until the request loop ends (after a Ctrl+C).
    pub fn wait(mut self) {
        self.join();
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.server = None;
        self.state = ServerState::Stopped;
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if self.state() == ServerState::Serving {
            self.stop();
        }
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, ctx: &ServeContext) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url = request.url().to_string();

    if let Some(port) = ctx.ws_port
        && url.split('?').next() == Some(HOTRELOAD_PATH)
    {
        return response::respond_hotreload_js(request, port);
    }

    let roots = [ctx.output_dir.as_path(), ctx.static_root.as_path()];
    match path::resolve_path(&url, &roots) {
        Some(path) => response::respond_file(request, &path, ctx.ws_port.is_some()),
        None => {
            crate::debug!("serve"; "404 {}", url);
            response::respond_not_found(request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_project;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, TcpStream};

    fn get(addr: SocketAddr, method: &str, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(
            stream,
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    fn config(root: &std::path::Path) -> BuildConfig {
        let mut config = test_project(root);
        config.serve.interface = Ipv4Addr::LOCALHOST.into();
        config.serve.port = 0;
        fs::create_dir_all(config.output.dir.join("pkg")).unwrap();
        fs::write(
            config.output.dir.join("index.html"),
            "<html><body>app</body></html>",
        )
        .unwrap();
        fs::write(config.output.dir.join("pkg/index_bg.wasm"), b"\0asm").unwrap();
        config
    }

    #[test]
    fn test_stop_releases_port() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());

        let mut handle = DevServer::bind(&config, None).unwrap().spawn().unwrap();
        let addr = handle.addr();
        assert_eq!(handle.state(), ServerState::Serving);
        assert!(get(addr, "GET", "/").starts_with("HTTP/1.1 200"));

        handle.stop();
        assert_eq!(handle.state(), ServerState::Stopped);

        // the accept thread closes the listener once the server is dropped
        config.serve.port = addr.port();
        let rebound = (0..50).find_map(|_| {
            DevServer::bind(&config, None).ok().or_else(|| {
                std::thread::sleep(std::time::Duration::from_millis(20));
                None
            })
        });
        assert_eq!(rebound.unwrap().addr.port(), addr.port());
    }

    #[test]
    fn test_port_in_use_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        let first = DevServer::bind(&config, None).unwrap();

        config.serve.port = first.addr.port();
        let err = DevServer::bind(&config, None).err().unwrap();
        assert!(err.to_string().contains("Failed to bind"));
    }

    #[test]
    fn test_serves_output_with_hotreload() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let handle = DevServer::bind(&config, Some(35729)).unwrap().spawn().unwrap();
        let addr = handle.addr();

        let index = get(addr, "GET", "/");
        assert!(index.contains("text/html"));
        assert!(index.contains("<script src=\"/__wasp/hotreload.js\"></script>\n</body>"));

        let wasm = get(addr, "GET", "/pkg/index_bg.wasm");
        assert!(wasm.contains("application/wasm"));

        let script = get(addr, "GET", "/__wasp/hotreload.js");
        assert!(script.starts_with("HTTP/1.1 200"));
        assert!(script.contains("35729"));

        let head = get(addr, "HEAD", "/index.html");
        assert!(head.starts_with("HTTP/1.1 200"));
        assert!(!head.contains("<body>"));

        assert!(get(addr, "GET", "/missing.js").starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_no_injection_without_hot_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let handle = DevServer::bind(&config, None).unwrap().spawn().unwrap();

        let index = get(handle.addr(), "GET", "/");
        assert!(!index.contains("hotreload"));
        assert!(get(handle.addr(), "GET", "/__wasp/hotreload.js").starts_with("HTTP/1.1 404"));
    }
}
