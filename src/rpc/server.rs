//! RPC Server
//!
//! Hosts the WebSocket RPC endpoint on a small hyper http1 server. Clients
//! upgrade at `/rpc`; every other route answers a JSON info payload so the
//! port is easy to probe. Each connection multiplexes client frames with
//! reload notifications from the file watcher.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_tungstenite::{is_upgrade_request, tungstenite::Message, upgrade, HyperWebsocket};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::patch::{PatchError, SaveRequest};
use crate::reload::EditHold;
use crate::rpc::{
    EditorBackend, ReloadNotification, RpcRequest, RpcResponse, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::watch::SourceWatcher;

/// Start the editor server and run until the process exits
pub async fn serve(config: Config) -> Result<()> {
    let address = config.address()?;

    let edit_hold = EditHold::new(config.hold_duration());
    let (reload_tx, _reload_keepalive) = broadcast::channel(64);

    let _watcher = SourceWatcher::start(
        &config.root,
        &config.watch_extensions,
        edit_hold.clone(),
        reload_tx.clone(),
    )
    .context("failed to start source watcher")?;

    let backend = Arc::new(EditorBackend::new(config, edit_hold));

    let listener = bind_with_backoff(address).await?;
    log::info!("jsx-editor-server listening on {}", address);

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let backend = Arc::clone(&backend);
        let reload_tx = reload_tx.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let backend = Arc::clone(&backend);
                let reload_tx = reload_tx.clone();
                async move { Ok::<_, Infallible>(handle_request(req, backend, reload_tx).await) }
            });

            if let Err(err) = http1::Builder::new()
                .serve_connection(io, service)
                .with_upgrades()
                .await
            {
                log::error!("error serving connection: {err}");
            }
        });
    }
}

/// Bind the listener, retrying briefly when the port is still held by a
/// previous instance shutting down.
async fn bind_with_backoff(address: SocketAddr) -> Result<TcpListener> {
    const MAX_BIND_ATTEMPTS: u32 = 5;
    const BASE_BACKOFF_MS: u64 = 200;

    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match TcpListener::bind(address).await {
            Ok(listener) => return Ok(listener),
            Err(err)
                if err.kind() == std::io::ErrorKind::AddrInUse && attempts < MAX_BIND_ATTEMPTS =>
            {
                let delay = BASE_BACKOFF_MS * 2u64.pow(attempts - 1);
                log::warn!(
                    "port {} in use, retrying in {}ms (attempt {}/{})",
                    address.port(),
                    delay,
                    attempts,
                    MAX_BIND_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(err) => {
                bail!("failed to bind to {address}: {err} (after {attempts} attempts)");
            }
        }
    }
}

async fn handle_request(
    mut request: Request<Incoming>,
    backend: Arc<EditorBackend>,
    reload_tx: broadcast::Sender<PathBuf>,
) -> Response<Full<Bytes>> {
    if request.uri().path() == "/rpc" {
        if !is_upgrade_request(&request) {
            return json_response(
                json!({ "error": "/rpc must be called as a websocket upgrade request" }),
                StatusCode::BAD_REQUEST,
            );
        }

        match upgrade(&mut request, None) {
            Ok((response, websocket)) => {
                let reload_rx = reload_tx.subscribe();
                tokio::spawn(async move {
                    if let Err(err) = handle_socket(websocket, backend, reload_rx).await {
                        log::error!("error on editor socket: {err:#}");
                    }
                });
                response
            }
            Err(err) => json_response(
                json!({ "error": format!("websocket upgrade failed: {err}") }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    } else {
        json_response(
            json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }),
            StatusCode::OK,
        )
    }
}

fn json_response(value: Value, status: StatusCode) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(value.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Drive one editor connection: requests in, responses and reloads out
async fn handle_socket(
    websocket: HyperWebsocket,
    backend: Arc<EditorBackend>,
    mut reload_rx: broadcast::Receiver<PathBuf>,
) -> Result<()> {
    let mut websocket = websocket.await?;
    log::debug!("editor client connected");

    loop {
        tokio::select! {
            changed = reload_rx.recv() => match changed {
                Ok(path) => {
                    let frame = serde_json::to_string(&ReloadNotification::new(&path))?;
                    if websocket.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("client fell behind; dropped {skipped} reload notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            message = websocket.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let reply = dispatch(&backend, text.as_str()).await;
                    if websocket.send(Message::Text(reply.into())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                    // tungstenite answers pings on its own
                }
                Some(Ok(Message::Close(_))) => {
                    log::debug!("editor client disconnected");
                    break;
                }
                Some(Ok(_)) => {
                    // binary frames are not part of the protocol
                }
                Some(Err(err)) => {
                    log::error!("websocket error: {err}");
                    break;
                }
                None => break,
            },
        }
    }

    Ok(())
}

/// Route one request frame to its handler and build the response frame
async fn dispatch(backend: &EditorBackend, raw: &str) -> String {
    let request: RpcRequest = match serde_json::from_str(raw) {
        Ok(request) => request,
        Err(err) => {
            return RpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("malformed request: {err}"),
            )
            .to_json();
        }
    };
    let id = request.id.unwrap_or(Value::Null);

    match request.method.as_str() {
        "save" => match serde_json::from_value::<SaveRequest>(request.params) {
            Ok(save) => match backend.save(save).await {
                Ok(()) => RpcResponse::success(id, Value::Null).to_json(),
                Err(err) => {
                    // Log and rethrow to the caller's transport. Patch
                    // errors are caller mistakes (bad coordinates, empty
                    // value), not server faults.
                    log::error!("save failed: {err:#}");
                    let code = if err.downcast_ref::<PatchError>().is_some() {
                        INVALID_PARAMS
                    } else {
                        INTERNAL_ERROR
                    };
                    RpcResponse::failure(id, code, format!("{err:#}")).to_json()
                }
            },
            Err(err) => RpcResponse::failure(
                id,
                INVALID_PARAMS,
                format!("invalid save parameters: {err}"),
            )
            .to_json(),
        },
        other => {
            RpcResponse::failure(id, METHOD_NOT_FOUND, format!("unknown method '{other}'"))
                .to_json()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_extensions;
    use serde_json::json;

    fn backend_in(dir: &std::path::Path) -> EditorBackend {
        let config = Config {
            root: dir.canonicalize().expect("canonicalize test root"),
            host: "127.0.0.1".to_string(),
            port: 0,
            hold_ms: 100,
            watch_extensions: default_extensions(),
            log_level: "info".to_string(),
        };
        EditorBackend::new(config, EditHold::new(Duration::from_millis(100)))
    }

    #[tokio::test]
    async fn test_dispatch_save_success() {
        let dir = tempfile::tempdir().expect("create tempdir");
        std::fs::write(dir.path().join("a.tsx"), "<mesh scale={1} />\n").expect("fixture");
        let backend = backend_in(dir.path());

        let frame = json!({
            "id": 1,
            "method": "save",
            "params": {
                "source": { "fileName": "a.tsx", "lineNumber": 1, "columnNumber": 1 },
                "value": { "scale": 2 },
            },
        })
        .to_string();

        let reply = dispatch(&backend, &frame).await;
        assert_eq!(reply, r#"{"id":1,"result":null}"#);

        let content = std::fs::read_to_string(dir.path().join("a.tsx")).expect("read back");
        assert_eq!(content, "<mesh scale={2} />\n");
    }

    #[tokio::test]
    async fn test_dispatch_save_error_is_rethrown() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let backend = backend_in(dir.path());

        let frame = json!({
            "id": 2,
            "method": "save",
            "params": {
                "source": { "fileName": "missing.tsx", "lineNumber": 1, "columnNumber": 1 },
                "value": { "scale": 2 },
            },
        })
        .to_string();

        let reply = dispatch(&backend, &frame).await;
        assert!(reply.contains(r#""id":2"#));
        assert!(reply.contains("no such source file"));
    }

    #[tokio::test]
    async fn test_dispatch_element_not_found_is_invalid_params() {
        let dir = tempfile::tempdir().expect("create tempdir");
        std::fs::write(dir.path().join("a.tsx"), "<mesh scale={1} />\n").expect("fixture");
        let backend = backend_in(dir.path());

        let frame = json!({
            "id": 5,
            "method": "save",
            "params": {
                "source": { "fileName": "a.tsx", "lineNumber": 7, "columnNumber": 1 },
                "value": { "scale": 2 },
            },
        })
        .to_string();

        let reply = dispatch(&backend, &frame).await;
        assert!(reply.contains(&format!(r#""code":{INVALID_PARAMS}"#)));
        assert!(reply.contains("no JSX element opens at"));
    }

    #[tokio::test]
    async fn test_dispatch_missing_file_is_internal_error() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let backend = backend_in(dir.path());

        let frame = json!({
            "id": 6,
            "method": "save",
            "params": {
                "source": { "fileName": "missing.tsx", "lineNumber": 1, "columnNumber": 1 },
                "value": { "scale": 2 },
            },
        })
        .to_string();

        let reply = dispatch(&backend, &frame).await;
        assert!(reply.contains(&format!(r#""code":{INTERNAL_ERROR}"#)));
    }

    #[tokio::test]
    async fn test_dispatch_missing_params() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let backend = backend_in(dir.path());

        let reply = dispatch(&backend, r#"{"id":3,"method":"save"}"#).await;
        assert!(reply.contains("invalid save parameters"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_method() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let backend = backend_in(dir.path());

        let reply = dispatch(&backend, r#"{"id":4,"method":"rename","params":{}}"#).await;
        assert!(reply.contains("unknown method 'rename'"));
    }

    #[tokio::test]
    async fn test_dispatch_malformed_frame() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let backend = backend_in(dir.path());

        let reply = dispatch(&backend, "not json").await;
        assert!(reply.contains("malformed request"));
        assert!(reply.contains(r#""id":null"#));
    }
}
