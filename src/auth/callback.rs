//! One-shot local HTTP listener for the OAuth redirect
//!
//! The listener serves until the first request carrying a `code` query
//! parameter, hands the code to the waiting task over a oneshot channel and
//! then stops itself. Requests without a code get a 400 and the listener
//! keeps running.

use anyhow::{Context, Result};
use oauth2::AuthorizationCode;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use url::Url;

const SUCCESS_BODY: &str = "<h1> OAuth code received you may close this tab.</h1>";
const MISSING_CODE_BODY: &str = "<h1> No code found in query string.</h1>";

/// Upper bound on the bytes read from one request; the request line is all we need.
const MAX_REQUEST_BYTES: usize = 8192;

/// Lifecycle of the listener. `Captured` is entered at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Listening,
    Captured,
    Stopped,
}

/// Single-assignment slot for the code; the sender is taken by the first
/// request that carries one.
type CodeSlot = Arc<Mutex<Option<oneshot::Sender<AuthorizationCode>>>>;

/// A bound, not yet serving, callback listener.
pub struct CallbackListener {
    listener: TcpListener,
}

impl CallbackListener {
    /// Bind the callback address. An address already in use is an error;
    /// there is no retry and no fallback port.
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        let listener = TcpListener::bind((host, port)).await.with_context(|| {
            format!(
                "Failed to bind OAuth callback listener on {}:{} (is the port already in use?)",
                host, port
            )
        })?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read callback listener address")
    }

    /// Start serving on a background task.
    pub fn spawn(self) -> CallbackHandle {
        let (code_tx, code_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(ListenerState::Listening);
        let slot: CodeSlot = Arc::new(Mutex::new(Some(code_tx)));

        let task = tokio::spawn(accept_loop(self.listener, slot, Arc::new(state_tx)));

        CallbackHandle {
            code_rx,
            state_rx,
            task,
        }
    }
}

/// Handle to a running listener.
pub struct CallbackHandle {
    code_rx: oneshot::Receiver<AuthorizationCode>,
    state_rx: watch::Receiver<ListenerState>,
    task: JoinHandle<Result<()>>,
}

impl CallbackHandle {
    pub fn state(&self) -> ListenerState {
        *self.state_rx.borrow()
    }

    /// Block until a code has been captured and the listener has stopped.
    pub async fn wait(self) -> Result<AuthorizationCode> {
        let code = self.code_rx.await;
        let served = self.task.await.context("OAuth callback listener task panicked")?;
        served?;
        code.context("OAuth callback listener stopped without receiving a code")
    }
}

async fn accept_loop(
    listener: TcpListener,
    slot: CodeSlot,
    state: Arc<watch::Sender<ListenerState>>,
) -> Result<()> {
    let mut state_rx = state.subscribe();
    if let Ok(addr) = listener.local_addr() {
        tracing::debug!("OAuth callback listener on {}", addr);
    }

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted.context("OAuth callback listener accept failed")?;
                tracing::debug!("Callback connection from {}", peer);

                let slot = slot.clone();
                let state = state.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &slot, &state).await {
                        tracing::debug!("Callback connection failed: {:#}", e);
                    }
                });
            }
            _ = until_captured(&mut state_rx) => break,
        }
    }

    drop(listener);
    state.send_replace(ListenerState::Stopped);
    tracing::debug!("OAuth callback listener stopped");
    Ok(())
}

async fn until_captured(state_rx: &mut watch::Receiver<ListenerState>) {
    let _ = state_rx
        .wait_for(|s| *s == ListenerState::Captured)
        .await;
}

async fn handle_connection(
    mut stream: TcpStream,
    slot: &CodeSlot,
    state: &watch::Sender<ListenerState>,
) -> Result<()> {
    let head = read_request_line(&mut stream).await?;
    let request = String::from_utf8_lossy(&head);
    let target = request_target(&request);

    let Some(code) = extract_code(target) else {
        tracing::debug!("Callback request without code");
        return write_response(&mut stream, "400 Bad Request", MISSING_CODE_BODY).await;
    };

    let sender = slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    match sender {
        Some(tx) => {
            let _ = tx.send(AuthorizationCode::new(code));
        }
        None => tracing::debug!("Code already captured, ignoring repeat"),
    }

    let written = write_response(&mut stream, "200 OK", SUCCESS_BODY).await;

    // Stop request goes to the accept loop; this task never waits on it.
    state.send_if_modified(|s| {
        if *s == ListenerState::Listening {
            *s = ListenerState::Captured;
            true
        } else {
            false
        }
    });

    written
}

/// Read until the end of the request line, EOF or [`MAX_REQUEST_BYTES`];
/// the line may arrive split over several segments.
async fn read_request_line(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !head.contains(&b'\n') && head.len() < MAX_REQUEST_BYTES {
        let n = stream
            .read(&mut chunk)
            .await
            .context("Failed to read callback request")?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
    }
    Ok(head)
}

async fn write_response(stream: &mut TcpStream, status: &str, body: &str) -> Result<()> {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write callback response")?;
    let _ = stream.shutdown().await;
    Ok(())
}

/// Request target from the request line: "GET /path?query HTTP/1.1".
fn request_target(request: &str) -> &str {
    request
        .lines()
        .next()
        .and_then(|line| line.split_ascii_whitespace().nth(1))
        .unwrap_or("/")
}

/// Decoded, non-empty `code` query parameter of a request target.
fn extract_code(target: &str) -> Option<String> {
    let url = Url::parse(&format!("http://localhost{}", target)).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}
