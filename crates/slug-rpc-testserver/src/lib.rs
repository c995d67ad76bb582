//! Slug RPC Test Server
//!
//! An HTTP/1.1 server bound to an ephemeral loopback port, for driving a
//! blocking client from ordinary `#[test]` functions. The server runs hyper
//! on a tokio runtime owned by a background thread. Each request is
//! recorded, the handler picks a [`Reply`], and connections are kept alive
//! so connection reuse can be observed through [`TestServer::connections`].

pub mod recorded;

use std::io;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub use recorded::RecordedRequest;

type Handler = dyn Fn(&RecordedRequest) -> Reply + Send + Sync;

/// Scripted reply for one request.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    /// Sleep this long before writing anything back.
    pub delay: Option<Duration>,
}

impl Reply {
    /// Reply with an arbitrary status and body.
    pub fn raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    /// 200 reply carrying a JSON document.
    pub fn json(value: &Value) -> Self {
        Self::raw(200, value.to_string())
    }

    /// 200 reply carrying a `result` envelope.
    pub fn result(result: Value) -> Self {
        Self::json(&json!({"jsonrpc": "2.0", "result": result, "id": null}))
    }

    /// 200 reply carrying an `error` envelope.
    pub fn error(code: i64, message: &str) -> Self {
        Self::json(&json!({
            "jsonrpc": "2.0",
            "error": {"code": code, "message": message},
            "id": null
        }))
    }

    /// Replace the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Hold the reply back for `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json-rpc"));
        response
    }
}

/// State shared between the accept loop and connection tasks
struct Shared {
    handler: Box<Handler>,
    requests: Mutex<Vec<RecordedRequest>>,
    connections: AtomicUsize,
}

impl Shared {
    fn requests(&self) -> MutexGuard<'_, Vec<RecordedRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Running test server. Stops accepting when dropped.
pub struct TestServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server that answers every request through `handler`.
    pub fn spawn<F>(handler: F) -> io::Result<Self>
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        let listener = StdTcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let shared = Arc::new(Shared {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            connections: AtomicUsize::new(0),
        });
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let thread = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("slug-rpc-testserver".to_string())
                .spawn(move || {
                    runtime.block_on(accept_loop(listener, shared, shutdown_rx));
                    runtime.shutdown_background();
                })?
        };

        tracing::debug!("test server listening on {}", addr);

        Ok(Self {
            addr,
            shared,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// Start a server that sends the same reply to every request.
    pub fn replying(reply: Reply) -> io::Result<Self> {
        Self::spawn(move |_| reply.clone())
    }

    /// Endpoint URL for clients.
    pub fn url(&self) -> String {
        format!("http://{}/rpc", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests().clone()
    }

    /// TCP connections accepted so far.
    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

async fn accept_loop(
    listener: StdTcpListener,
    shared: Arc<Shared>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let listener = match TcpListener::from_std(listener) {
        Ok(listener) => listener,
        Err(e) => {
            tracing::warn!("failed to register listener: {}", e);
            return;
        }
    };

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    shared.connections.fetch_add(1, Ordering::SeqCst);
                    let io = TokioIo::new(stream);
                    let shared = Arc::clone(&shared);

                    tokio::spawn(async move {
                        let service = service_fn(move |req| handle(Arc::clone(&shared), req));
                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            tracing::debug!("connection ended: {}", e);
                        }
                    });
                }
                Err(e) => tracing::warn!("accept failed: {}", e),
            },
            _ = &mut shutdown_rx => break,
        }
    }
}

async fn handle(
    shared: Arc<Shared>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();
    let request = RecordedRequest::new(&Request::from_parts(parts, ()), &body);

    let reply = (shared.handler)(&request);
    shared.requests().push(request);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    Ok(reply.into_response())
}
