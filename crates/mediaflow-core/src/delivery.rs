//! Getting server-produced bytes onto the user's disk.
//!
//! Two techniques, both performed by the presentation layer through
//! [`DeliveryBackend`]:
//! - **Native submission**: a transient hidden form posted to the download
//!   endpoint. The browser streams the attachment itself, so size limits and
//!   pop-up blockers do not apply, but nothing reports success or failure.
//! - **Blob save**: an in-memory payload exposed through an object URL and
//!   clicked via a temporary anchor. The URL must be released afterwards.

use std::time::Duration;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::media::DownloadRequest;

/// A hidden form the browser submits on our behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeSubmission {
    /// HTTP method, always `POST`.
    pub method: &'static str,
    /// Form action URL.
    pub action: String,
    /// Hidden input `(name, value)` pairs.
    pub fields: Vec<(String, String)>,
}

impl NativeSubmission {
    /// Build the download form for a request.
    #[must_use]
    pub fn for_download(config: &ClientConfig, request: &DownloadRequest) -> Self {
        Self {
            method: "POST",
            action: config.download_url(),
            fields: request
                .form_fields()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

/// Identifies a submitted form until it is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionHandle(pub u64);

/// An object URL backing a blob save.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(pub String);

impl ObjectUrl {
    /// The URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Browser side effects used by the flow controllers.
#[cfg_attr(test, mockall::automock)]
pub trait DeliveryBackend {
    /// Attach and submit a hidden form.
    fn submit_native(&self, submission: &NativeSubmission) -> Result<SubmissionHandle>;

    /// Remove a previously submitted form from the page.
    fn discard_submission(&self, handle: SubmissionHandle);

    /// Wrap `bytes` in an object URL and trigger a save as `filename`.
    fn save_blob(&self, bytes: &[u8], content_type: &str, filename: &str) -> Result<ObjectUrl>;

    /// Release an object URL created by [`save_blob`](Self::save_blob).
    fn release_object_url(&self, url: ObjectUrl);
}

/// Suspends a flow for a fixed delay.
#[allow(async_fn_in_trait)]
pub trait Timer {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Timer`] backed by the tokio runtime.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(not(target_arch = "wasm32"))]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
