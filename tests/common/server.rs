//! Scripted HTTP server for failure-injection tests.
//!
//! wiremock covers well-formed fixtures, but it cannot close a connection
//! halfway through a framed body. This server speaks just enough HTTP/1.1 to
//! serve HEAD, GET, and ranged GET for a fixed set of files, and can be
//! scripted to truncate bodies mid-stream, ignore Range headers, or fail
//! specific paths — everything the resume machinery needs to be exercised
//! against.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One file the server knows how to serve.
#[derive(Clone)]
pub struct FileSpec {
    pub path: String,
    pub body: Vec<u8>,
    /// Serve with chunked transfer encoding and no Content-Length, so the
    /// client cannot know the total size.
    pub chunked: bool,
    /// Optional Content-Disposition header value.
    pub content_disposition: Option<String>,
    /// Send the Content-Disposition on HEAD responses only, as servers do
    /// when the GET is delegated to a dumb byte store.
    pub disposition_on_head_only: bool,
}

impl FileSpec {
    pub fn new(path: &str, body: Vec<u8>) -> Self {
        Self {
            path: path.to_string(),
            body,
            chunked: false,
            content_disposition: None,
            disposition_on_head_only: false,
        }
    }

    pub fn chunked(mut self) -> Self {
        self.chunked = true;
        self
    }

    pub fn with_disposition(mut self, value: &str) -> Self {
        self.content_disposition = Some(value.to_string());
        self
    }

    pub fn with_probe_only_disposition(mut self, value: &str) -> Self {
        self.content_disposition = Some(value.to_string());
        self.disposition_on_head_only = true;
        self
    }
}

/// Scripted behavior shared by all files.
pub struct ServerScript {
    pub files: Vec<FileSpec>,
    /// Byte budgets applied to successive GETs in arrival order; a budget
    /// smaller than the requested slice truncates the body and drops the
    /// connection.
    pub budgets: VecDeque<usize>,
    /// Budget applied to every GET once `budgets` is exhausted.
    pub default_budget: Option<usize>,
    /// Answer ranged GETs with 206. When false the server ignores Range
    /// headers entirely and always replies 200 from byte zero.
    pub honor_range: bool,
    /// ETag advertised on every response.
    pub etag: Option<String>,
    /// Paths that fail every GET with 500.
    pub failing_paths: Vec<String>,
    /// Pending body replacements. The next GET for a listed path swaps the
    /// body in and answers with a full 200, as a real server would once its
    /// resource changed and the range validator no longer matches.
    pub swaps: Vec<(String, Vec<u8>)>,
    /// Artificial delay while the body is in flight, to widen the window
    /// observed by the concurrency gauge.
    pub body_delay: Duration,
}

impl ServerScript {
    pub fn serving(files: Vec<FileSpec>) -> Self {
        Self {
            files,
            budgets: VecDeque::new(),
            default_budget: None,
            honor_range: true,
            etag: None,
            failing_paths: Vec::new(),
            swaps: Vec::new(),
            body_delay: Duration::ZERO,
        }
    }

    pub fn with_budgets(mut self, budgets: Vec<usize>) -> Self {
        self.budgets = budgets.into();
        self
    }

    pub fn with_default_budget(mut self, budget: usize) -> Self {
        self.default_budget = Some(budget);
        self
    }

    pub fn ignoring_range(mut self) -> Self {
        self.honor_range = false;
        self
    }

    pub fn with_etag(mut self, etag: &str) -> Self {
        self.etag = Some(etag.to_string());
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing_paths.push(path.to_string());
        self
    }

    pub fn swapping_body(mut self, path: &str, body: Vec<u8>) -> Self {
        self.swaps.push((path.to_string(), body));
        self
    }

    pub fn with_body_delay(mut self, delay: Duration) -> Self {
        self.body_delay = delay;
        self
    }
}

/// A request the server observed.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub range: Option<String>,
    pub if_range: Option<String>,
}

pub struct ServerState {
    script: Mutex<ServerScript>,
    pub requests: Mutex<Vec<SeenRequest>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ServerState {
    pub fn get_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == "GET")
            .count()
    }

    pub fn get_paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == "GET")
            .map(|r| r.path.clone())
            .collect()
    }

    pub fn ranges_seen(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == "GET")
            .map(|r| r.range.clone())
            .collect()
    }

    pub fn if_ranges_seen(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == "GET")
            .map(|r| r.if_range.clone())
            .collect()
    }
}

pub struct FlakyServer {
    pub base_url: String,
    pub state: Arc<ServerState>,
}

impl FlakyServer {
    pub fn url_for(&self, path: &str) -> reqwest::Url {
        reqwest::Url::parse(&format!("{}{}", self.base_url, path)).unwrap()
    }
}

/// Binds to an ephemeral port and serves the script until dropped.
pub async fn spawn(script: ServerScript) -> FlakyServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(ServerState {
        script: Mutex::new(script),
        requests: Mutex::new(Vec::new()),
        in_flight: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
    });

    let accept_state = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let conn_state = Arc::clone(&accept_state);
            tokio::spawn(async move {
                let _ = handle_connection(socket, conn_state).await;
            });
        }
    });

    FlakyServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

async fn handle_connection(mut socket: TcpStream, state: Arc<ServerState>) -> std::io::Result<()> {
    let request = read_request(&mut socket).await?;
    let Some(request) = request else {
        return Ok(());
    };
    state.requests.lock().unwrap().push(request.clone());

    // Snapshot what this request needs while holding the script lock.
    let (file, budget, honor_range, etag, failing, swapped, body_delay) = {
        let mut script = state.script.lock().unwrap();
        let mut swapped = false;
        if request.method == "GET" && request.range.is_some() {
            if let Some(pos) = script.swaps.iter().position(|(p, _)| *p == request.path) {
                let (_, new_body) = script.swaps.remove(pos);
                if let Some(f) = script.files.iter_mut().find(|f| f.path == request.path) {
                    f.body = new_body;
                    swapped = true;
                }
            }
        }
        let file = script
            .files
            .iter()
            .find(|f| f.path == request.path)
            .cloned();
        let budget = if request.method == "GET" {
            script
                .budgets
                .pop_front()
                .or(script.default_budget)
        } else {
            None
        };
        (
            file,
            budget,
            script.honor_range,
            script.etag.clone(),
            script.failing_paths.contains(&request.path),
            swapped,
            script.body_delay,
        )
    };

    let Some(file) = file else {
        return write_simple(&mut socket, "404 Not Found").await;
    };
    if failing && request.method == "GET" {
        return write_simple(&mut socket, "500 Internal Server Error").await;
    }

    let total = file.body.len();
    let mut extra = String::new();
    if let Some(etag) = &etag {
        extra.push_str(&format!("ETag: \"{}\"\r\n", etag));
    }
    if let Some(cd) = &file.content_disposition {
        if request.method == "HEAD" || !file.disposition_on_head_only {
            extra.push_str(&format!("Content-Disposition: {}\r\n", cd));
        }
    }

    if request.method == "HEAD" {
        let head = if file.chunked {
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n{}Connection: close\r\n\r\n",
                extra
            )
        } else {
            format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nAccept-Ranges: bytes\r\n{}Connection: close\r\n\r\n",
                total, extra
            )
        };
        socket.write_all(head.as_bytes()).await?;
        return socket.shutdown().await;
    }

    // GET from here on. A freshly swapped body always restarts from byte
    // zero, regardless of any Range header.
    let start = match (&request.range, honor_range && !swapped) {
        (Some(range), true) => parse_range_start(range).unwrap_or(0),
        _ => 0,
    };
    let slice = &file.body[start.min(total)..];

    state.in_flight.fetch_add(1, Ordering::SeqCst);
    bump_max(&state);

    let result = if file.chunked {
        write_chunked(&mut socket, slice, budget, &extra, body_delay).await
    } else if start > 0 {
        let head = format!(
            "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\nContent-Type: application/octet-stream\r\nAccept-Ranges: bytes\r\n{}Connection: close\r\n\r\n",
            slice.len(),
            start,
            total - 1,
            total,
            extra
        );
        write_body(&mut socket, &head, slice, budget, body_delay).await
    } else {
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nAccept-Ranges: bytes\r\n{}Connection: close\r\n\r\n",
            total, extra
        );
        write_body(&mut socket, &head, slice, budget, body_delay).await
    };

    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    result
}

fn bump_max(state: &ServerState) {
    let current = state.in_flight.load(Ordering::SeqCst);
    let mut max = state.max_in_flight.load(Ordering::SeqCst);
    while current > max {
        match state.max_in_flight.compare_exchange(
            max,
            current,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => break,
            Err(observed) => max = observed,
        }
    }
}

async fn write_body(
    socket: &mut TcpStream,
    head: &str,
    slice: &[u8],
    budget: Option<usize>,
    delay: Duration,
) -> std::io::Result<()> {
    socket.write_all(head.as_bytes()).await?;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    match budget {
        Some(budget) if budget < slice.len() => {
            // Truncate mid-body: the framed length promises more bytes than
            // we deliver, so the client sees an unexpected EOF.
            socket.write_all(&slice[..budget]).await?;
            socket.flush().await?;
            socket.shutdown().await
        }
        _ => {
            socket.write_all(slice).await?;
            socket.flush().await?;
            socket.shutdown().await
        }
    }
}

async fn write_chunked(
    socket: &mut TcpStream,
    slice: &[u8],
    budget: Option<usize>,
    extra: &str,
    delay: Duration,
) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Type: application/octet-stream\r\n{}Connection: close\r\n\r\n",
        extra
    );
    socket.write_all(head.as_bytes()).await?;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let limit = budget.unwrap_or(slice.len()).min(slice.len());
    for piece in slice[..limit].chunks(1024) {
        let frame = format!("{:x}\r\n", piece.len());
        socket.write_all(frame.as_bytes()).await?;
        socket.write_all(piece).await?;
        socket.write_all(b"\r\n").await?;
    }
    if limit == slice.len() {
        // Proper terminator; the stream ends naturally.
        socket.write_all(b"0\r\n\r\n").await?;
    }
    socket.flush().await?;
    socket.shutdown().await
}

async fn write_simple(socket: &mut TcpStream, status: &str) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<Option<SeenRequest>> {
    let mut buffer = Vec::new();
    let mut byte = [0u8; 1024];
    while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut byte).await?;
        if n == 0 {
            return Ok(None);
        }
        buffer.extend_from_slice(&byte[..n]);
        if buffer.len() > 64 * 1024 {
            return Ok(None);
        }
    }

    let text = String::from_utf8_lossy(&buffer);
    let mut lines = text.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut range = None;
    let mut if_range = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "range" => range = Some(value.trim().to_string()),
                "if-range" => if_range = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    Ok(Some(SeenRequest {
        method,
        path,
        range,
        if_range,
    }))
}

fn parse_range_start(range: &str) -> Option<usize> {
    range
        .strip_prefix("bytes=")?
        .split('-')
        .next()?
        .parse()
        .ok()
}
