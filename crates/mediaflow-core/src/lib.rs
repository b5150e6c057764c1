//! `MediaFlow` Core Library
//!
//! This crate holds the client-side logic of the `MediaFlow` web client:
//! - Download flow: fetch video metadata, choose resolution and media type,
//!   hand a native form submission to the browser
//! - Conversion flow: choose a local file and target format, upload it,
//!   save the converted result under the server-provided name
//! - Theme mapping from platform identifiers to accent colors
//! - Shared busy/status helpers and `Content-Disposition` parsing
//!
//! Browser side effects (form submission, blob saves, timers) go through the
//! [`DeliveryBackend`] and [`Timer`] traits so the flows run unchanged in
//! tests and in the browser.
//!
//! # Error Handling
//!
//! Every fallible operation returns [`Result`]; see the [`error`] module.
//!
//! ```rust,ignore
//! use mediaflow_core::{DownloadController, Result};
//!
//! fn start(controller: &mut DownloadController) -> Result<()> {
//!     controller.set_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
//!     let _ticket = controller.begin_fetch()?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod conversion;
pub mod delivery;
pub mod disposition;
pub mod download;
pub mod error;
pub mod format;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod media;
pub mod status;
pub mod theme;

pub use api::{FETCH_FAILED_MESSAGE, HttpMediaApi, MediaApi};
pub use config::{
    CONVERT_PATH, ClientConfig, DEFAULT_FORM_CLEANUP_DELAY_MS, DEFAULT_OBJECT_URL_REVOKE_DELAY_MS,
    DEFAULT_OPTIMISTIC_DOWNLOAD_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DOWNLOAD_PATH, INFO_PATH,
};
pub use conversion::{ConversionController, ConversionPhase, SavedConversion, save_converted};
#[cfg(not(target_arch = "wasm32"))]
pub use delivery::TokioTimer;
pub use delivery::{DeliveryBackend, NativeSubmission, ObjectUrl, SubmissionHandle, Timer};
pub use disposition::{parse_content_disposition_filename, resolve_save_filename};
pub use download::{
    DOWNLOAD_STARTED_MESSAGE, DOWNLOADING_MESSAGE, DownloadController, DownloadPhase,
    EMPTY_URL_MESSAGE, FetchTicket, PendingDownload,
};
pub use error::{Error, ErrorKind, Result};
pub use format::{format_bytes, format_duration};
#[cfg(not(target_arch = "wasm32"))]
pub use logging::{LogRotation, LoggingConfig, LoggingError, LoggingGuard, init_logging};
pub use media::{
    ConversionFile, ConversionFormat, ConversionJob, ConvertedMedia, DownloadRequest,
    DownloadSelection, FALLBACK_RESOLUTION_LABEL, FALLBACK_RESOLUTION_VALUE, FormatCategory,
    MediaType, ResolutionOption, UNKNOWN_TITLE, VideoInfo, resolution_options,
};
pub use status::{BusyFlag, StatusKind, StatusMessage};
pub use theme::{DEFAULT_THEME, ThemeTokens, map_theme};
