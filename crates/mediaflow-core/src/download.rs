//! Download flow controller.
//!
//! Owns the lifecycle `Idle → Fetching → Previewed → Downloading →
//! Previewed`: solicit a URL, fetch its metadata, present resolution and
//! media-type choices, and hand a native form submission to the browser.
//!
//! Each step is exposed twice: as a split `begin_*`/`complete_*` pair for
//! presentation layers that must not hold the controller across an `await`,
//! and as a single async operation (`fetch_info`, `submit_download`).

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{FETCH_FAILED_MESSAGE, MediaApi};
use crate::config::ClientConfig;
use crate::delivery::{DeliveryBackend, NativeSubmission, SubmissionHandle, Timer};
use crate::error::{Error, Result};
use crate::media::{
    DownloadRequest, DownloadSelection, MediaType, ResolutionOption, VideoInfo,
    resolution_options,
};
use crate::status::{BusyFlag, StatusMessage};
use crate::theme::{DEFAULT_THEME, ThemeTokens, map_theme};

/// Inline message for an empty URL field.
pub const EMPTY_URL_MESSAGE: &str = "Please paste a video URL first.";

/// Status shown while the native submission is in flight.
pub const DOWNLOADING_MESSAGE: &str = "⏳ Downloading… this may take a moment.";

/// Optimistic status shown after the fixed delay.
pub const DOWNLOAD_STARTED_MESSAGE: &str =
    "✅ Download started! Check your browser's Downloads folder.";

/// Where the download flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    /// Nothing fetched yet, or the preview was discarded.
    Idle,
    /// A metadata request is in flight.
    Fetching,
    /// Preview and options are shown.
    Previewed,
    /// A native submission is awaiting its optimistic completion.
    Downloading,
}

/// Proof that a fetch was started; hand it back to
/// [`DownloadController::complete_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    url: String,
    generation: u64,
}

impl FetchTicket {
    /// Trimmed URL the request must be keyed by.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A submitted download waiting out its optimistic delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDownload {
    /// What was submitted.
    pub request: DownloadRequest,
    /// The transient form to discard.
    pub handle: SubmissionHandle,
    /// Wait before discarding the form.
    pub cleanup_delay: Duration,
    /// Further wait before reporting success.
    pub settle_delay: Duration,
}

/// State machine for the download workflow.
#[derive(Debug, Clone)]
pub struct DownloadController {
    config: ClientConfig,
    url: String,
    fetching: BusyFlag,
    downloading: BusyFlag,
    /// Bumped whenever the preview is invalidated, so late fetches are dropped.
    generation: u64,
    info: Option<VideoInfo>,
    options: Vec<ResolutionOption>,
    selection: DownloadSelection,
    url_error: Option<String>,
    status: Option<StatusMessage>,
}

impl DownloadController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            url: String::new(),
            fetching: BusyFlag::default(),
            downloading: BusyFlag::default(),
            generation: 0,
            info: None,
            options: Vec::new(),
            selection: DownloadSelection::default(),
            url_error: None,
            status: None,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DownloadPhase {
        if self.fetching.is_busy() {
            DownloadPhase::Fetching
        } else if self.downloading.is_busy() {
            DownloadPhase::Downloading
        } else if self.info.is_some() {
            DownloadPhase::Previewed
        } else {
            DownloadPhase::Idle
        }
    }

    /// Raw URL field contents.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Metadata of the current preview.
    #[must_use]
    pub const fn info(&self) -> Option<&VideoInfo> {
        self.info.as_ref()
    }

    /// Options shown in the resolution dropdown; empty when hidden.
    #[must_use]
    pub fn options(&self) -> &[ResolutionOption] {
        &self.options
    }

    /// Current media type and resolution choice.
    #[must_use]
    pub const fn selection(&self) -> DownloadSelection {
        self.selection
    }

    /// The option a download would use.
    #[must_use]
    pub fn selected_option(&self) -> Option<&ResolutionOption> {
        self.options.get(self.selection.resolution_index)
    }

    /// Whether the resolution dropdown is interactive.
    #[must_use]
    pub const fn resolution_enabled(&self) -> bool {
        self.selection.resolution_enabled()
    }

    /// Inline error under the URL field.
    #[must_use]
    pub fn url_error(&self) -> Option<&str> {
        self.url_error.as_deref()
    }

    /// Download status line.
    #[must_use]
    pub const fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Whether the fetch control is disabled.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.fetching.is_busy()
    }

    /// Whether the download control is disabled.
    #[must_use]
    pub const fn is_downloading(&self) -> bool {
        self.downloading.is_busy()
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // URL field
    // -------------------------------------------------------------------------

    /// Record new URL field contents.
    ///
    /// Clearing the field discards the preview and returns the default theme
    /// for the caller to apply.
    pub fn set_url(&mut self, text: impl Into<String>) -> Option<ThemeTokens> {
        self.url = text.into();
        if !self.url.trim().is_empty() {
            return None;
        }
        if self.info.is_some() || self.fetching.is_busy() {
            debug!("URL cleared, discarding preview");
        }
        self.generation += 1;
        self.info = None;
        self.options.clear();
        self.selection.resolution_index = 0;
        Some(DEFAULT_THEME)
    }

    // -------------------------------------------------------------------------
    // Fetch
    // -------------------------------------------------------------------------

    /// Validate the URL and enter the fetching state.
    ///
    /// An empty URL sets the inline error and leaves everything else as is.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket> {
        let url = self.url.trim().to_string();
        self.url_error = None;

        if url.is_empty() {
            self.url_error = Some(EMPTY_URL_MESSAGE.to_string());
            return Err(Error::validation(EMPTY_URL_MESSAGE));
        }
        self.fetching.acquire("Fetch")?;

        self.generation += 1;
        self.info = None;
        self.options.clear();
        self.selection.resolution_index = 0;
        self.status = None;

        info!("Fetching metadata for {}", url);
        Ok(FetchTicket {
            url,
            generation: self.generation,
        })
    }

    /// Apply the result of a metadata request and leave the fetching state.
    ///
    /// Returns the platform theme on success, `None` if the preview was
    /// invalidated while the request was in flight.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<VideoInfo>,
    ) -> Result<Option<ThemeTokens>> {
        self.fetching.release();

        if ticket.generation != self.generation {
            debug!("Dropping stale metadata for {}", ticket.url);
            return Ok(None);
        }

        match result {
            Ok(info) => {
                self.options = resolution_options(&info.resolutions);
                self.selection.resolution_index = 0;
                let theme = map_theme(info.platform_key());
                info!(
                    "Preview ready: {:?} ({} options)",
                    info.display_title(),
                    self.options.len()
                );
                self.info = Some(info);
                self.status = None;
                Ok(Some(theme))
            }
            Err(e) => {
                warn!("Metadata fetch failed: {}", e);
                self.url_error = Some(match &e {
                    Error::Request { message, .. } => message.clone(),
                    _ => FETCH_FAILED_MESSAGE.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Fetch metadata for the current URL.
    pub async fn fetch_info<A: MediaApi>(&mut self, api: &A) -> Result<Option<ThemeTokens>> {
        let ticket = self.begin_fetch()?;
        let result = api.fetch_info(ticket.url()).await;
        self.complete_fetch(ticket, result)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Switch between video and audio.
    ///
    /// The option list and chosen index survive the round trip.
    pub fn select_media_type(&mut self, media_type: MediaType) {
        debug!("Media type: {}", media_type);
        self.selection.media_type = media_type;
    }

    /// Choose a resolution by dropdown index.
    pub fn select_resolution(&mut self, index: usize) -> Result<()> {
        if !self.resolution_enabled() {
            return Err(Error::validation(
                "Resolution cannot be changed for audio downloads.",
            ));
        }
        if index >= self.options.len() {
            return Err(Error::validation(format!(
                "No resolution option at index {index}"
            )));
        }
        self.selection.resolution_index = index;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Download
    // -------------------------------------------------------------------------

    /// Build a request from the displayed selection and enter the
    /// downloading state.
    ///
    /// The URL is not re-checked against the fetched metadata; the server
    /// validates it again.
    pub fn begin_download(&mut self) -> Result<DownloadRequest> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::validation(EMPTY_URL_MESSAGE));
        }
        let option = self
            .selected_option()
            .ok_or_else(|| Error::validation("Fetch the video info before downloading."))?;

        let request = DownloadRequest {
            url: url.to_string(),
            resolution: option.submit_value().to_string(),
            format_id: option.format_id.clone(),
            media_type: self.selection.media_type,
        };
        self.downloading.acquire("Download")?;
        self.status = Some(StatusMessage::info(DOWNLOADING_MESSAGE));

        info!(
            "Submitting download: {} [{} / {:?}]",
            request.url, request.media_type, request.resolution
        );
        Ok(request)
    }

    /// The hidden form for a request.
    #[must_use]
    pub fn native_submission(&self, request: &DownloadRequest) -> NativeSubmission {
        NativeSubmission::for_download(&self.config, request)
    }

    /// Report optimistic completion and leave the downloading state.
    ///
    /// The browser gives no completion signal; a server-side failure after
    /// submission still ends up here.
    pub fn finish_download(&mut self) {
        self.downloading.release();
        self.status = Some(StatusMessage::success(DOWNLOAD_STARTED_MESSAGE));
    }

    /// Report that the submission could not be made and leave the
    /// downloading state.
    pub fn fail_download(&mut self, error: &Error) {
        warn!("Download submission failed: {}", error);
        self.downloading.release();
        self.status = Some(StatusMessage::failure(error));
    }

    /// Build the request and hand its hidden form to the browser.
    ///
    /// On success the caller waits out the returned delays, discarding the
    /// form after the first, then calls [`finish_download`](Self::finish_download).
    pub fn dispatch_download<D: DeliveryBackend>(
        &mut self,
        delivery: &D,
    ) -> Result<PendingDownload> {
        let request = self.begin_download()?;
        let submission = self.native_submission(&request);

        let handle = match delivery.submit_native(&submission) {
            Ok(handle) => handle,
            Err(e) => {
                self.fail_download(&e);
                return Err(e);
            }
        };

        let cleanup_delay = self.config.form_cleanup_delay();
        Ok(PendingDownload {
            request,
            handle,
            cleanup_delay,
            settle_delay: self
                .config
                .optimistic_download_delay()
                .saturating_sub(cleanup_delay),
        })
    }

    /// Submit the current selection through a native form.
    pub async fn submit_download<D, T>(&mut self, delivery: &D, timer: &T) -> Result<DownloadRequest>
    where
        D: DeliveryBackend,
        T: Timer,
    {
        let pending = self.dispatch_download(delivery)?;

        timer.sleep(pending.cleanup_delay).await;
        delivery.discard_submission(pending.handle);
        timer.sleep(pending.settle_delay).await;

        self.finish_download();
        Ok(pending.request)
    }
}

impl Default for DownloadController {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::delivery::MockDeliveryBackend;
    use crate::status::StatusKind;

    /// Returns a canned response and counts calls.
    struct StubApi {
        response: RefCell<Option<Result<VideoInfo>>>,
        calls: Cell<usize>,
        last_url: RefCell<Option<String>>,
    }

    impl StubApi {
        fn returning(response: Result<VideoInfo>) -> Self {
            Self {
                response: RefCell::new(Some(response)),
                calls: Cell::new(0),
                last_url: RefCell::new(None),
            }
        }
    }

    impl MediaApi for StubApi {
        async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
            self.calls.set(self.calls.get() + 1);
            *self.last_url.borrow_mut() = Some(url.to_string());
            self.response
                .borrow_mut()
                .take()
                .expect("stub called more than once")
        }

        async fn convert(
            &self,
            _job: &crate::media::ConversionJob,
        ) -> Result<crate::media::ConvertedMedia> {
            unreachable!("download tests never convert")
        }
    }

    #[derive(Default)]
    struct RecordingTimer {
        slept: RefCell<Vec<Duration>>,
    }

    impl Timer for RecordingTimer {
        async fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
        }
    }

    fn video(platform: &str, resolutions: Vec<ResolutionOption>) -> VideoInfo {
        VideoInfo {
            title: Some("T".to_string()),
            uploader: None,
            platform: Some(platform.to_string()),
            duration_secs: None,
            thumbnail_url: None,
            resolutions,
        }
    }

    fn previewed() -> DownloadController {
        let mut controller = DownloadController::default();
        controller.set_url("https://x.test/v");
        let ticket = controller.begin_fetch().unwrap();
        controller
            .complete_fetch(
                ticket,
                Ok(video(
                    "Youtube",
                    vec![
                        ResolutionOption::new("1080p", "137"),
                        ResolutionOption::new("720p", "136"),
                    ],
                )),
            )
            .unwrap();
        controller
    }

    #[tokio::test]
    async fn test_empty_url_never_calls_service() {
        let api = StubApi::returning(Ok(video("", vec![])));
        let mut controller = DownloadController::default();
        controller.set_url("   \t ");

        let result = controller.fetch_info(&api).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(api.calls.get(), 0);
        assert_eq!(controller.url_error(), Some(EMPTY_URL_MESSAGE));
        assert_eq!(controller.phase(), DownloadPhase::Idle);
        assert!(!controller.is_fetching());
    }

    #[tokio::test]
    async fn test_fetch_uses_trimmed_url_and_selects_first() {
        let api = StubApi::returning(Ok(video(
            "Twitch",
            vec![
                ResolutionOption::new("1440p", "400"),
                ResolutionOption::new("720p", "300"),
            ],
        )));
        let mut controller = DownloadController::default();
        controller.set_url("  https://x.test/v  ");

        let theme = controller.fetch_info(&api).await.unwrap();

        assert_eq!(api.last_url.borrow().as_deref(), Some("https://x.test/v"));
        assert_eq!(theme, Some(map_theme("Twitch")));
        assert_eq!(controller.phase(), DownloadPhase::Previewed);
        assert_eq!(controller.selection().resolution_index, 0);
        assert_eq!(controller.selected_option().unwrap().label, "1440p");
    }

    #[tokio::test]
    async fn test_empty_resolutions_synthesize_fallback() {
        let api = StubApi::returning(Ok(video("Vimeo", vec![])));
        let mut controller = DownloadController::default();
        controller.set_url("https://x.test/v");

        let theme = controller.fetch_info(&api).await.unwrap();

        assert_eq!(theme, Some(DEFAULT_THEME));
        assert_eq!(controller.options().len(), 1);
        assert!(controller.options()[0].is_fallback());
        assert_eq!(controller.options()[0].format_id, "");
    }

    #[tokio::test]
    async fn test_fetch_transport_failure_shows_generic_message() {
        for error in [
            Error::network("connection refused"),
            Error::Parse("expected value at line 1 column 1".to_string()),
        ] {
            let api = StubApi::returning(Err(error));
            let mut controller = previewed();

            let result = controller.fetch_info(&api).await;

            assert!(result.is_err());
            assert_eq!(controller.url_error(), Some(FETCH_FAILED_MESSAGE));
            assert!(!controller.is_fetching());
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_server_message_and_releases() {
        let api = StubApi::returning(Err(Error::request(400, "Unsupported URL: x")));
        let mut controller = previewed();

        let result = controller.fetch_info(&api).await;

        assert!(result.is_err());
        assert_eq!(controller.url_error(), Some("Unsupported URL: x"));
        assert!(controller.info().is_none());
        assert!(controller.options().is_empty());
        assert!(!controller.is_fetching());
        assert_eq!(controller.phase(), DownloadPhase::Idle);
    }

    #[test]
    fn test_second_fetch_rejected_while_pending() {
        let mut controller = DownloadController::default();
        controller.set_url("https://x.test/v");
        let _ticket = controller.begin_fetch().unwrap();

        assert_eq!(controller.phase(), DownloadPhase::Fetching);
        assert!(matches!(controller.begin_fetch(), Err(Error::Busy("Fetch"))));
    }

    #[test]
    fn test_clearing_url_drops_in_flight_result() {
        let mut controller = DownloadController::default();
        controller.set_url("https://x.test/v");
        let ticket = controller.begin_fetch().unwrap();

        assert_eq!(controller.set_url(""), Some(DEFAULT_THEME));
        let theme = controller
            .complete_fetch(ticket, Ok(video("Youtube", vec![])))
            .unwrap();

        assert_eq!(theme, None);
        assert!(controller.info().is_none());
        assert!(!controller.is_fetching());
        assert_eq!(controller.phase(), DownloadPhase::Idle);
    }

    #[test]
    fn test_clearing_url_discards_preview() {
        let mut controller = previewed();
        assert_eq!(controller.set_url("https://x.test/other"), None);
        assert_eq!(controller.phase(), DownloadPhase::Previewed);

        assert_eq!(controller.set_url("  "), Some(DEFAULT_THEME));
        assert_eq!(controller.phase(), DownloadPhase::Idle);
        assert!(controller.options().is_empty());
    }

    #[test]
    fn test_audio_mode_keeps_resolution_list() {
        let mut controller = previewed();
        controller.select_resolution(1).unwrap();
        let before = controller.options().to_vec();

        controller.select_media_type(MediaType::Audio);
        assert!(!controller.resolution_enabled());
        assert!(controller.select_resolution(0).is_err());
        assert_eq!(controller.options(), before.as_slice());

        controller.select_media_type(MediaType::Video);
        assert!(controller.resolution_enabled());
        assert_eq!(controller.options(), before.as_slice());
        assert_eq!(controller.selection().resolution_index, 1);
    }

    #[test]
    fn test_select_resolution_out_of_range() {
        let mut controller = previewed();
        assert!(matches!(
            controller.select_resolution(2),
            Err(Error::Validation(_))
        ));
        assert_eq!(controller.selection().resolution_index, 0);
    }

    #[test]
    fn test_begin_download_requires_preview() {
        let mut controller = DownloadController::default();
        controller.set_url("https://x.test/v");
        assert!(matches!(
            controller.begin_download(),
            Err(Error::Validation(_))
        ));
        assert!(!controller.is_downloading());
    }

    #[test]
    fn test_begin_download_uses_edited_url() {
        let mut controller = previewed();
        controller.set_url(" https://x.test/edited ");
        controller.select_media_type(MediaType::Audio);

        let request = controller.begin_download().unwrap();
        assert_eq!(request.url, "https://x.test/edited");
        assert_eq!(request.resolution, "1080p");
        assert_eq!(request.format_id, "137");
        assert_eq!(request.media_type, MediaType::Audio);
        assert_eq!(controller.phase(), DownloadPhase::Downloading);
        assert_eq!(controller.status().unwrap().text, DOWNLOADING_MESSAGE);
    }

    #[tokio::test]
    async fn test_submit_download_submits_then_reports_optimistically() {
        let mut controller = previewed();
        controller.select_resolution(1).unwrap();

        let mut delivery = MockDeliveryBackend::new();
        delivery
            .expect_submit_native()
            .withf(|s| {
                s.action == "/api/download"
                    && s.fields.contains(&("format_id".to_string(), "136".to_string()))
            })
            .times(1)
            .returning(|_| Ok(SubmissionHandle(7)));
        delivery
            .expect_discard_submission()
            .withf(|h| *h == SubmissionHandle(7))
            .times(1)
            .return_const(());
        let timer = RecordingTimer::default();

        let request = controller.submit_download(&delivery, &timer).await.unwrap();

        assert_eq!(request.resolution, "720p");
        assert_eq!(
            *timer.slept.borrow(),
            vec![Duration::from_millis(100), Duration::from_millis(1400)]
        );
        let status = controller.status().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert_eq!(status.text, DOWNLOAD_STARTED_MESSAGE);
        assert!(!controller.is_downloading());
        assert_eq!(controller.phase(), DownloadPhase::Previewed);
    }

    #[tokio::test]
    async fn test_submit_download_backend_failure_releases() {
        let mut controller = previewed();
        let mut delivery = MockDeliveryBackend::new();
        delivery
            .expect_submit_native()
            .returning(|_| Err(Error::delivery("document unavailable")));
        delivery.expect_discard_submission().never();
        let timer = RecordingTimer::default();

        let result = controller.submit_download(&delivery, &timer).await;

        assert!(matches!(result, Err(Error::Delivery(_))));
        assert!(timer.slept.borrow().is_empty());
        assert!(!controller.is_downloading());
        let status = controller.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("document unavailable"));
    }

    #[test]
    fn test_dispatch_download_splits_optimistic_delay() {
        let mut controller = previewed();
        let mut delivery = MockDeliveryBackend::new();
        delivery
            .expect_submit_native()
            .times(1)
            .returning(|_| Ok(SubmissionHandle(3)));

        let pending = controller.dispatch_download(&delivery).unwrap();

        assert_eq!(pending.handle, SubmissionHandle(3));
        assert_eq!(pending.cleanup_delay, Duration::from_millis(100));
        assert_eq!(pending.settle_delay, Duration::from_millis(1400));
        assert!(controller.is_downloading());
        controller.finish_download();
        assert!(!controller.is_downloading());
    }

    #[test]
    fn test_second_download_rejected_while_pending() {
        let mut controller = previewed();
        controller.begin_download().unwrap();
        assert!(matches!(
            controller.begin_download(),
            Err(Error::Busy("Download"))
        ));
        controller.finish_download();
        assert!(controller.begin_download().is_ok());
    }

    #[test]
    fn test_new_fetch_clears_download_status() {
        let mut controller = previewed();
        controller.begin_download().unwrap();
        controller.finish_download();
        assert!(controller.status().is_some());

        let _ticket = controller.begin_fetch().unwrap();
        assert!(controller.status().is_none());
        assert!(controller.options().is_empty());
    }
}
