//! Remote image download.
//!
//! A remote image becomes a `data:` URI handle, so every backend can read it
//! without a temp file. The timeout wraps the whole request, body included:
//! when it fires the request future is dropped, which cancels the transfer.
//!
//! Decoding, resizing and encoding are CPU-bound, so
//! [`Fetcher::download_and_resize`] runs them through
//! [`tokio::task::spawn_blocking`] and the runtime stays free for I/O.

use crate::error::PrepError;
use crate::imaging::operations::resize_to_budget;
use crate::imaging::{
    ImageAsset, ImageBackend, ImageHandle, JPEG_MIME, QualityLadder, ResizeMode, data_uri,
};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(5000);

/// `http://` or `https://`; anything else is treated as a local path or a
/// `data:` URI.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// HTTP client plus the timeout applied to each fetch.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    /// A zero timeout means [`DEFAULT_FETCH_TIMEOUT`].
    pub fn new(timeout: Duration) -> Result<Self, PrepError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PrepError::FetchFailed {
                uri: String::new(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self::with_client(client, timeout))
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        let timeout = if timeout.is_zero() {
            DEFAULT_FETCH_TIMEOUT
        } else {
            timeout
        };
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Download `uri` and return it as a `data:` URI handle.
    ///
    /// The mime type comes from `Content-Type` (parameters stripped) and
    /// defaults to `image/jpeg`.
    pub async fn fetch(&self, uri: &str) -> Result<ImageHandle, PrepError> {
        info!(uri, timeout_ms = self.timeout.as_millis() as u64, "fetching image");
        let failed = |reason: String| PrepError::FetchFailed {
            uri: uri.to_string(),
            reason,
        };

        let request = async {
            let response = self
                .client
                .get(uri)
                .send()
                .await
                .map_err(|e| failed(e.to_string()))?;
            if !response.status().is_success() {
                return Err(failed(format!("HTTP {}", response.status())));
            }
            let mime = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(';').next())
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(JPEG_MIME)
                .to_string();
            let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
            Ok::<_, PrepError>((mime, bytes))
        };

        let (mime, bytes) = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| PrepError::FetchTimeout {
                uri: uri.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        info!(uri, bytes = bytes.len(), mime = %mime, "fetched image");
        Ok(ImageHandle::new(data_uri::encode(&mime, &bytes)))
    }

    /// Fetch URLs; pass paths and `data:` URIs through untouched.
    pub async fn resolve(&self, source: &str) -> Result<ImageHandle, PrepError> {
        if is_url(source) {
            self.fetch(source).await
        } else {
            debug!(source, "using local source");
            Ok(ImageHandle::new(source))
        }
    }

    /// Download `opts.uri` and render it into an exact box under a byte
    /// budget.
    ///
    /// The backend is moved onto the blocking pool for the encode passes.
    pub async fn download_and_resize<B>(
        &self,
        backend: B,
        opts: &DownloadAndResizeOpts,
        ladder: QualityLadder,
    ) -> Result<ImageAsset, PrepError>
    where
        B: ImageBackend + Send + 'static,
    {
        let handle = self.resolve(&opts.uri).await?;
        let (width, height, mode, max_bytes) = (opts.width, opts.height, opts.mode, opts.max_bytes);

        tokio::task::spawn_blocking(move || {
            resize_to_budget(&backend, &handle, width, height, mode, max_bytes, ladder)
        })
        .await
        .map_err(|e| PrepError::TaskFailed(format!("Resize task panicked: {e}")))?
    }
}

/// Parameters for [`download_and_resize`].
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadAndResizeOpts {
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub mode: ResizeMode,
    pub max_bytes: u64,
    /// `None` (or zero) uses [`DEFAULT_FETCH_TIMEOUT`].
    pub timeout: Option<Duration>,
}

/// One-shot download + resize with a fresh client.
pub async fn download_and_resize<B>(
    backend: B,
    opts: &DownloadAndResizeOpts,
    ladder: QualityLadder,
) -> Result<ImageAsset, PrepError>
where
    B: ImageBackend + Send + 'static,
{
    Fetcher::new(opts.timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT))?
        .download_and_resize(backend, opts, ladder)
        .await
}
