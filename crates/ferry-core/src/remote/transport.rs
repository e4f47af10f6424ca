//! HTTP transport to the file-transfer backend.
//!
//! [`Transport::send`] never fails: connection errors, undecodable bodies
//! and timeouts are all folded into a failed [`Envelope`]. Responses that
//! are not JSON (file downloads) come back untouched as a [`RawPayload`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tokio_util::io::ReaderStream;

use crate::error::{CoreError, CoreResult};
use crate::remote::envelope::{Envelope, TIMEOUT_MESSAGE};

/// Upper bound on a single request, body included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A local file selected for upload. The contents are streamed from disk
/// when the request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl UploadFile {
    /// Builds an upload handle from a local path, reading its size.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if it cannot be read.
    /// - [`CoreError::InvalidName`] if the path is a directory or has no file name.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        if metadata.is_dir() {
            return Err(CoreError::InvalidName(path.display().to_string()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CoreError::InvalidName(path.display().to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Upload(UploadFile),
}

/// One request to the backend.
///
/// When `headers` is empty the transport marks the body as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: &'static str,
    pub method: Method,
    pub body: Body,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn get(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            method: Method::Get,
            body: Body::Empty,
            headers: Vec::new(),
        }
    }

    pub fn post_json(endpoint: &'static str, body: Value) -> Self {
        Self {
            endpoint,
            method: Method::Post,
            body: Body::Json(body),
            headers: Vec::new(),
        }
    }

    pub fn upload(endpoint: &'static str, file: UploadFile, headers: Vec<(String, String)>) -> Self {
        Self {
            endpoint,
            method: Method::Post,
            body: Body::Upload(file),
            headers,
        }
    }

    /// Returns the JSON body, if any.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Looks up a caller-supplied header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A non-JSON response body, handed to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub content_type: Option<String>,
    /// File name announced by the server via `Content-Disposition`.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// The classified outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Structured(Envelope<Value>),
    Raw(RawPayload),
}

impl Reply {
    /// Collapses the reply into an envelope. A raw body where JSON was
    /// expected is reported as a failure.
    pub fn into_envelope(self) -> Envelope<Value> {
        match self {
            Reply::Structured(envelope) => envelope,
            Reply::Raw(raw) => Envelope::transport_failure(format!(
                "unexpected non-JSON response ({})",
                raw.content_type.as_deref().unwrap_or("no content type")
            )),
        }
    }
}

/// Sends requests to the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Reply;
}

#[derive(Debug, thiserror::Error)]
enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot read upload file {path}: {source}")]
    Upload {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// [`Transport`] over HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport rooted at `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    async fn execute(&self, request: Request) -> Result<Reply, TransportError> {
        let url = self.url(request.endpoint);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        if request.headers.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        } else {
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.body(value.to_string()),
            Body::Upload(file) => {
                let handle = tokio::fs::File::open(&file.path)
                    .await
                    .map_err(|source| TransportError::Upload {
                        path: file.path.clone(),
                        source,
                    })?;
                let stream = reqwest::Body::wrap_stream(ReaderStream::new(handle));
                let part = Part::stream_with_length(stream, file.size).file_name(file.name);
                builder.multipart(Form::new().part("file", part))
            }
        };

        let response = builder.send().await?;
        let content_type = header_string(&response, CONTENT_TYPE);
        let file_name = header_string(&response, CONTENT_DISPOSITION)
            .as_deref()
            .and_then(disposition_file_name);
        let bytes = response.bytes().await?;

        if content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
        {
            return Ok(Reply::Structured(Envelope::from_slice(&bytes)?));
        }

        Ok(Reply::Raw(RawPayload {
            content_type,
            file_name,
            bytes: bytes.to_vec(),
        }))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Reply {
        let endpoint = request.endpoint;
        tracing::debug!(endpoint, method = ?request.method, "sending request");

        match tokio::time::timeout(self.timeout, self.execute(request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(TransportError::Http(e))) if e.is_timeout() => {
                tracing::warn!(endpoint, "request timed out");
                Reply::Structured(Envelope::transport_failure(TIMEOUT_MESSAGE))
            }
            Ok(Err(e)) => {
                tracing::warn!(endpoint, error = %e, "request failed");
                Reply::Structured(Envelope::transport_failure(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(endpoint, timeout = ?self.timeout, "request timed out");
                Reply::Structured(Envelope::transport_failure(TIMEOUT_MESSAGE))
            }
        }
    }
}

fn header_string(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Extracts `filename` from a `Content-Disposition` header value.
fn disposition_file_name(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
