//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use player_proxy::config::ProxyConfig;
use player_proxy::http::HttpServer;
use player_proxy::lifecycle::Shutdown;

pub const API_KEY: &str = "test-key";

/// A mock upstream and what it has seen.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicUsize>,
    /// Request lines, e.g. `GET /player-info?region=me&uid=1 HTTP/1.1`.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Read the request head and return its first line.
async fn read_request_line(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                head.extend_from_slice(&chunk[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&head)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn http_response(status: u16, body: &str) -> String {
    let status_text = match status {
        200 => "200 OK",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        other => return format!(
            "HTTP/1.1 {} Unknown\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            other,
            body.len(),
            body
        ),
    };

    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    )
}

/// Start a programmable mock upstream. `f` receives the request line.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> MockUpstream
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let (task_calls, task_requests) = (calls.clone(), requests.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let calls = task_calls.clone();
                    let requests = task_requests.clone();
                    tokio::spawn(async move {
                        let line = read_request_line(&mut socket).await;
                        calls.fetch_add(1, Ordering::SeqCst);
                        requests.lock().unwrap().push(line.clone());

                        let (status, body) = f(line).await;
                        let _ = socket.write_all(http_response(status, &body).as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream { addr, calls, requests }
}

/// Start a mock upstream that always answers 200 with `body`.
pub async fn start_json_upstream(body: &'static str) -> MockUpstream {
    start_programmable_upstream(move |_| async move { (200, body.to_string()) }).await
}

/// A mock upstream that answers only after `delay`.
pub struct HangingUpstream {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicUsize>,
    /// Set once the client hung up before the answer was sent.
    pub cancelled: Arc<AtomicBool>,
}

pub async fn start_hanging_upstream(delay: Duration) -> HangingUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let cancelled = Arc::new(AtomicBool::new(false));

    let (task_calls, task_cancelled) = (calls.clone(), cancelled.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let calls = task_calls.clone();
                    let cancelled = task_cancelled.clone();
                    tokio::spawn(async move {
                        read_request_line(&mut socket).await;
                        calls.fetch_add(1, Ordering::SeqCst);

                        let mut buf = [0u8; 64];
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {
                                let _ = socket.write_all(http_response(200, "{}").as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            res = socket.read(&mut buf) => {
                                if matches!(res, Ok(0) | Err(_)) {
                                    cancelled.store(true, Ordering::SeqCst);
                                }
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    HangingUpstream { addr, calls, cancelled }
}

/// An address nothing listens on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Proxy configuration pointing at `upstream`.
pub fn proxy_config(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.upstream.base_url = format!("http://{}/player-info", upstream);
    config.upstream.timeout_ms = 2_000;
    config.upstream.system_proxy = false;
    config.access.api_key = API_KEY.into();
    config.static_files.root_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static").into();
    config
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let (addr, shutdown, _updates) = start_proxy_with_updates(config).await;
    (addr, shutdown)
}

/// Start the proxy and keep the config update channel.
pub async fn start_proxy_with_updates(
    config: ProxyConfig,
) -> (SocketAddr, Shutdown, mpsc::UnboundedSender<ProxyConfig>) {
    let shutdown = Shutdown::new();
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown, updates_tx)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// `GET /player-info` with the test key.
pub async fn lookup(proxy: SocketAddr, uid: &str) -> reqwest::Response {
    client()
        .get(format!("http://{}/player-info", proxy))
        .query(&[("uid", uid)])
        .header("x-api-key", API_KEY)
        .send()
        .await
        .expect("Proxy unreachable")
}
