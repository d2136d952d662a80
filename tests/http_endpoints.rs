//! Config loading and fragment upload against a throwaway local HTTP server.

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use humtap::app::{self, Settings};
use humtap::audio::{AudioBackend, CaptureTap, SignalGraph, TapFormat};
use humtap::config::{self, ConfigError, ConfigSource};
use humtap::params::{RecorderParams, UploadParams};
use humtap::recorder::{self, Capture, CaptureError, FragmentRecorder};
use humtap::upload::{HttpUploader, Upload, UploadOutcome};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct ReceivedRequest {
    method: String,
    path: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Answers every request with the same status and body
struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl StubServer {
    async fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let seen = Arc::clone(&seen);
                tokio::spawn(handle(stream, status, body, seen));
            }
        });
        Self { addr, requests }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn requests(&self) -> Vec<ReceivedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Read one request, record it, then answer.
///
/// Recording happens before the response so a client that has its answer
/// always finds its request in the log.
async fn handle(
    mut stream: TcpStream,
    status: u16,
    body: &'static str,
    seen: Arc<Mutex<Vec<ReceivedRequest>>>,
) -> Option<()> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&chunk[..n]);
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let mut content_length = 0;
    let mut content_type = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            if name == "content-length" {
                content_length = value.trim().parse().ok()?;
            } else if name == "content-type" {
                content_type = Some(value.trim().to_string());
            }
        }
    }

    let mut request_body = raw[header_end..].to_vec();
    while request_body.len() < content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        request_body.extend_from_slice(&chunk[..n]);
    }

    seen.lock().unwrap().push(ReceivedRequest {
        method,
        path,
        content_type,
        body: request_body,
    });

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await.ok()?;
    stream.shutdown().await.ok();
    Some(())
}

#[derive(Default)]
struct CountingBackend {
    starts: u32,
}

impl AudioBackend for CountingBackend {
    fn start(&mut self, _graph: SignalGraph) -> anyhow::Result<CaptureTap> {
        self.starts += 1;
        Ok(CaptureTap::new(TapFormat {
            sample_rate_hz: 8000,
            channels: 1,
        }))
    }
}

#[derive(Clone, Default)]
struct CountingUploader(Arc<Mutex<u32>>);

impl Upload for CountingUploader {
    fn upload(&self, _payload: Vec<u8>) -> impl Future<Output = UploadOutcome> + Send {
        *self.0.lock().unwrap() += 1;
        async { UploadOutcome::Delivered(200) }
    }
}

struct ScriptedCapture {
    payloads: VecDeque<Vec<u8>>,
    active: bool,
}

impl Capture for ScriptedCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.active {
            return Err(CaptureError::AlreadyActive);
        }
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<Vec<u8>, CaptureError> {
        self.active = false;
        Ok(self.payloads.pop_front().unwrap_or_default())
    }

    fn release(&mut self) {
        self.active = false;
    }
}

#[tokio::test]
async fn config_is_fetched_over_http() {
    let server = StubServer::start(200, r#"{"lambdaApiUrl":"https://x/ingest"}"#).await;
    let source = ConfigSource::parse(&server.url("/config.json"));

    let config = config::load(&source).await.unwrap();

    assert_eq!(config.lambda_api_url, "https://x/ingest");
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/config.json");
}

#[tokio::test]
async fn config_404_is_an_error() {
    let server = StubServer::start(404, "not found").await;
    let source = ConfigSource::parse(&server.url("/config.json"));

    let err = config::load(&source).await.unwrap_err();

    assert!(matches!(err, ConfigError::Status { status: 404, .. }));
}

#[tokio::test]
async fn config_404_prevents_startup() {
    let server = StubServer::start(404, "not found").await;
    let settings = Settings {
        config_source: ConfigSource::parse(&server.url("/config.json")),
        ..Default::default()
    };
    let mut backend = CountingBackend::default();
    let uploader = CountingUploader::default();

    let result = app::run(&settings, &mut backend, |_, _| Ok(uploader.clone())).await;

    assert!(result.is_err());
    assert_eq!(backend.starts, 0);
    assert_eq!(*uploader.0.lock().unwrap(), 0);
}

#[tokio::test]
async fn upload_posts_raw_bytes() {
    let server = StubServer::start(200, "{}").await;
    let uploader = HttpUploader::new(server.url("/ingest"), &UploadParams::default()).unwrap();

    let outcome = uploader.upload(vec![7u8; 1000]).await;

    assert_eq!(outcome, UploadOutcome::Delivered(200));
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/ingest");
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/octet-stream")
    );
    assert_eq!(requests[0].body, vec![7u8; 1000]);
}

#[tokio::test]
async fn upload_error_status_is_rejected_once() {
    let server = StubServer::start(502, "").await;
    let uploader = HttpUploader::new(server.url("/ingest"), &UploadParams::default()).unwrap();

    let outcome = uploader.upload(vec![1, 2, 3]).await;

    assert_eq!(outcome, UploadOutcome::Rejected(502));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn six_fragments_are_posted_in_order() {
    let server = StubServer::start(200, "{}").await;
    let uploader = HttpUploader::new(server.url("/ingest"), &UploadParams::default()).unwrap();
    let sizes = [100usize, 120, 90, 110, 95, 130];
    let mut capture = ScriptedCapture {
        payloads: sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| vec![i as u8 + 1; n])
            .collect(),
        active: false,
    };
    let mut fragment_recorder = FragmentRecorder::new(RecorderParams {
        fragment_duration: Duration::from_millis(20),
        max_fragments: 6,
        pause: Duration::from_millis(5),
    })
    .unwrap();

    let summary = recorder::run(&mut fragment_recorder, &mut capture, &uploader)
        .await
        .unwrap();

    assert!(fragment_recorder.is_done());
    assert_eq!(summary.delivered, 6);

    // Each upload completes before the next fragment starts, so arrival order is stable
    let requests = server.requests();
    assert_eq!(requests.len(), 6);
    for (i, (request, &size)) in requests.iter().zip(sizes.iter()).enumerate() {
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/ingest");
        assert_eq!(request.body, vec![i as u8 + 1; size]);
    }
}

/// Accepts connections and reads requests but never answers
async fn start_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut chunk = [0u8; 4096];
            let _ = stream.read(&mut chunk).await;
            held.push(stream);
        }
    });
    addr
}

#[tokio::test]
async fn silent_endpoint_times_out_and_recording_completes() {
    let addr = start_silent_server().await;
    let uploader = HttpUploader::new(
        format!("http://{}/ingest", addr),
        &UploadParams {
            timeout: Duration::from_millis(200),
        },
    )
    .unwrap();
    let mut capture = ScriptedCapture {
        payloads: VecDeque::from([vec![1u8; 50], vec![2u8; 50]]),
        active: false,
    };
    let mut fragment_recorder = FragmentRecorder::new(RecorderParams {
        fragment_duration: Duration::from_millis(20),
        max_fragments: 2,
        pause: Duration::from_millis(5),
    })
    .unwrap();

    let summary = tokio::time::timeout(
        Duration::from_secs(10),
        recorder::run(&mut fragment_recorder, &mut capture, &uploader),
    )
    .await
    .expect("recorder stalled on a silent endpoint")
    .unwrap();

    assert!(fragment_recorder.is_done());
    assert_eq!(summary.recorded, 2);
    assert_eq!(summary.failed_uploads, 2);
    assert_eq!(summary.delivered, 0);
}
