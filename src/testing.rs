// file: src/testing.rs
// description: in-process stand-in for the Ollama HTTP API used by unit tests
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::config::{Config, LlmConfig};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Routes = Arc<Mutex<HashMap<String, VecDeque<String>>>>;
type Requests = Arc<Mutex<Vec<(String, String)>>>;

/// Answers each request path with canned JSON bodies and records what it got.
pub struct MockOllama {
    base_url: String,
    requests: Requests,
}

impl MockOllama {
    /// Serve `(path, body)` pairs. A path listed several times answers with
    /// its bodies in order and then keeps repeating the last one. Unknown
    /// paths get a 404.
    pub async fn start(routes: &[(&str, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let mut table: HashMap<String, VecDeque<String>> = HashMap::new();
        for (path, body) in routes {
            table
                .entry(path.to_string())
                .or_default()
                .push_back(body.to_string());
        }

        let routes: Routes = Arc::new(Mutex::new(table));
        let requests: Requests = Arc::new(Mutex::new(Vec::new()));

        let (server_routes, server_requests) = (routes.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (routes, requests) = (server_routes.clone(), server_requests.clone());
                tokio::spawn(async move {
                    let _ = serve(stream, routes, requests).await;
                });
            }
        });

        Self { base_url, requests }
    }

    /// LLM settings pointing at this server with a single quick connect attempt.
    pub fn llm_config(&self) -> LlmConfig {
        let mut config = Config::default_config().llm;
        config.base_url = self.base_url.clone();
        config.connect_attempts = 1;
        config.connect_interval_secs = 0;
        config.request_timeout_secs = 5;
        config.pull_timeout_secs = 5;
        config
    }

    /// Request bodies received on `path`, oldest first.
    pub fn bodies(&self, path: &str) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

async fn serve(mut stream: TcpStream, routes: Routes, requests: Requests) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buffer[header_end..]).to_string();
    requests.lock().unwrap().push((path.clone(), body));

    let reply = {
        let mut routes = routes.lock().unwrap();
        routes.get_mut(&path).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        })
    };

    let response = match reply {
        Some(body) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
        None => "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found"
            .to_string(),
    };

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
