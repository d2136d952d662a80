//! Fragment upload.
//!
//! Each fragment is sent once. Failed uploads are logged and dropped: there
//! is no retry, backoff or queue, so a failed fragment is lost.

use std::fmt;
use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::params::UploadParams;

/// Result of a single upload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Endpoint answered 2xx
    Delivered(u16),
    /// Endpoint answered with a non-2xx status
    Rejected(u16),
    /// The request never completed
    Failed(String),
}

impl UploadOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, UploadOutcome::Delivered(_))
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Delivered(status) => write!(f, "delivered (HTTP {})", status),
            UploadOutcome::Rejected(status) => write!(f, "rejected (HTTP {})", status),
            UploadOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Destination for recorded fragments
pub trait Upload {
    fn upload(&self, payload: Vec<u8>) -> impl Future<Output = UploadOutcome> + Send;
}

/// POSTs raw fragment bytes to an HTTP endpoint
#[derive(Clone)]
pub struct HttpUploader {
    client: Client,
    endpoint: String,
}

impl HttpUploader {
    /// Every request is bounded by `params.timeout`, so a silent endpoint
    /// cannot hold the recorder.
    pub fn new(endpoint: impl Into<String>, params: &UploadParams) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(params.timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Upload for HttpUploader {
    fn upload(&self, payload: Vec<u8>) -> impl Future<Output = UploadOutcome> + Send {
        let request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload);

        async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    UploadOutcome::Delivered(response.status().as_u16())
                }
                Ok(response) => UploadOutcome::Rejected(response.status().as_u16()),
                Err(e) => UploadOutcome::Failed(e.to_string()),
            }
        }
    }
}
