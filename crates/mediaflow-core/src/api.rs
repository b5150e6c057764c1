//! Media service client.
//!
//! [`MediaApi`] is the seam the controllers talk through; [`HttpMediaApi`]
//! is the `reqwest` implementation used natively and in the browser (where
//! `reqwest` rides on `fetch`).

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::media::{ConversionJob, ConvertedMedia, ErrorBody, InfoResponse, VideoInfo};

/// Message shown when a metadata fetch fails without an error text from the server.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch video info.";

/// Operations the flow controllers need from the media service.
///
/// Futures are not required to be `Send`; the browser runtime is
/// single-threaded.
#[allow(async_fn_in_trait)]
pub trait MediaApi {
    /// `GET /api/info` for the exact (already trimmed) URL.
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo>;

    /// `POST /api/v2/convert` with the job's file and target format.
    async fn convert(&self, job: &ConversionJob) -> Result<ConvertedMedia>;
}

/// HTTP implementation of [`MediaApi`].
#[derive(Debug, Clone)]
pub struct HttpMediaApi {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpMediaApi {
    /// Create a client for the configured service.
    ///
    /// `api_base` must be an absolute URL; the browser binding fills it in
    /// from the page origin when the configuration leaves it empty.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        if config.api_base.trim().is_empty() {
            return Err(Error::Configuration(
                "api_base is required for the HTTP client".to_string(),
            ));
        }

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout());
        let client = builder
            .build()
            .map_err(|e| Error::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl MediaApi for HttpMediaApi {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        info!("Fetching video info for {}", url);

        let response = self
            .client
            .get(self.config.info_url())
            .query(&[("url", url)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message =
                server_error_message(&body).unwrap_or_else(|| FETCH_FAILED_MESSAGE.to_string());
            warn!("Video info request failed ({}): {}", status, message);
            return Err(Error::request(status.as_u16(), message));
        }

        let wire: InfoResponse = serde_json::from_str(&body)?;
        let info = VideoInfo::from(wire);
        debug!(
            "Video info: title={:?} platform={:?} resolutions={}",
            info.title,
            info.platform,
            info.resolutions.len()
        );
        Ok(info)
    }

    async fn convert(&self, job: &ConversionJob) -> Result<ConvertedMedia> {
        info!(
            "Uploading {} ({} bytes) for conversion to {}",
            job.file.name,
            job.file.size(),
            job.format
        );

        let mut part = Part::bytes(job.file.bytes.clone()).file_name(job.file.name.clone());
        if let Some(mime_type) = &job.file.mime_type {
            part = part.mime_str(mime_type)?;
        }
        let form = Form::new()
            .part("file", part)
            .text("target_format", job.format.as_str());

        let response = self
            .client
            .post(self.config.convert_url())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = server_error_message(&body)
                .unwrap_or_else(|| format!("Server error {}", status.as_u16()));
            warn!("Conversion failed ({}): {}", status, message);
            return Err(Error::request(status.as_u16(), message));
        }

        let content_disposition = header_string(response.headers(), &CONTENT_DISPOSITION);
        let content_type = header_string(response.headers(), &CONTENT_TYPE);
        let bytes = response.bytes().await?.to_vec();
        info!("Conversion returned {} bytes", bytes.len());

        Ok(ConvertedMedia {
            bytes,
            content_disposition,
            content_type,
        })
    }
}

/// Pull `error` out of a JSON failure body.
fn server_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}

fn header_string(headers: &HeaderMap, name: &reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
