//! Data model shared by the download and conversion flows.
//!
//! Wire types mirror the media service's JSON; domain types are what the
//! controllers hand to the presentation layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::disposition::resolve_save_filename;
use crate::error::{Error, Result};
use crate::format::{format_bytes, format_duration};

/// Label of the option synthesized when the service lists no resolutions.
pub const FALLBACK_RESOLUTION_LABEL: &str = "Best Available";

/// Resolution value submitted for the synthesized option.
pub const FALLBACK_RESOLUTION_VALUE: &str = "best";

/// Title shown when the service omits one.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

// =============================================================================
// Wire format
// =============================================================================

/// `GET /api/info` response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InfoResponse {
    /// Video title.
    pub title: Option<String>,
    /// Uploader/channel name.
    pub uploader: Option<String>,
    /// Extractor key, e.g. `Youtube`.
    pub platform: Option<String>,
    /// Duration in seconds; may be fractional.
    pub duration: Option<f64>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Resolution tiers, best first.
    pub resolutions: Option<Vec<WireResolution>>,
}

/// One entry of `resolutions` in the info response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireResolution {
    /// Display label, e.g. `1080p`.
    pub label: String,
    /// Server stream token.
    pub format_id: Option<String>,
    /// Size in bytes; may be fractional or null.
    pub filesize: Option<f64>,
    /// Whether the size is an estimate.
    pub estimated: Option<bool>,
}

/// `{ "error": "..." }` failure body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Server message.
    #[serde(default)]
    pub error: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_negative_integer(value: Option<f64>) -> Option<u64> {
    value.filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64)
}

// =============================================================================
// Download flow
// =============================================================================

/// One selectable quality tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionOption {
    /// Display label, unique within its list.
    pub label: String,
    /// Opaque server token; empty lets the server decide.
    pub format_id: String,
    /// Size in bytes, if known.
    pub filesize_bytes: Option<u64>,
    /// Whether `filesize_bytes` is approximate.
    pub estimated: bool,
    #[serde(skip)]
    fallback: bool,
}

impl ResolutionOption {
    /// Create an option without size information.
    pub fn new(label: impl Into<String>, format_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            format_id: format_id.into(),
            filesize_bytes: None,
            estimated: false,
            fallback: false,
        }
    }

    /// Attach a size to the option.
    #[must_use]
    pub const fn with_filesize(mut self, bytes: u64, estimated: bool) -> Self {
        self.filesize_bytes = Some(bytes);
        self.estimated = estimated;
        self
    }

    /// The option used when the service lists none.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            fallback: true,
            ..Self::new(FALLBACK_RESOLUTION_LABEL, "")
        }
    }

    /// Whether this is the synthesized fallback.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Text shown in the dropdown, e.g. `1080p (~50.0 MB)`.
    #[must_use]
    pub fn display_label(&self) -> String {
        match self.filesize_bytes {
            Some(bytes) if bytes > 0 => format!("{} (~{})", self.label, format_bytes(bytes)),
            _ => self.label.clone(),
        }
    }

    /// Value sent as the `resolution` form field.
    #[must_use]
    pub fn submit_value(&self) -> &str {
        if self.fallback {
            FALLBACK_RESOLUTION_VALUE
        } else {
            &self.label
        }
    }
}

impl From<WireResolution> for ResolutionOption {
    fn from(wire: WireResolution) -> Self {
        Self {
            label: wire.label,
            format_id: wire.format_id.unwrap_or_default(),
            filesize_bytes: non_negative_integer(wire.filesize),
            estimated: wire.estimated.unwrap_or(false),
            fallback: false,
        }
    }
}

/// Build the dropdown contents from the service's list.
///
/// Never empty: an empty list yields the single fallback option.
#[must_use]
pub fn resolution_options(resolutions: &[ResolutionOption]) -> Vec<ResolutionOption> {
    if resolutions.is_empty() {
        vec![ResolutionOption::fallback()]
    } else {
        resolutions.to_vec()
    }
}

/// Metadata for a remote video, replaced wholesale by every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoInfo {
    /// Video title.
    pub title: Option<String>,
    /// Uploader name.
    pub uploader: Option<String>,
    /// Platform key used for theming.
    pub platform: Option<String>,
    /// Duration in whole seconds.
    pub duration_secs: Option<u64>,
    /// Thumbnail URL.
    pub thumbnail_url: Option<String>,
    /// Resolution tiers as listed by the service, best first.
    pub resolutions: Vec<ResolutionOption>,
}

impl From<InfoResponse> for VideoInfo {
    fn from(wire: InfoResponse) -> Self {
        Self {
            title: non_empty(wire.title),
            uploader: non_empty(wire.uploader),
            platform: non_empty(wire.platform),
            duration_secs: non_negative_integer(wire.duration).filter(|d| *d > 0),
            thumbnail_url: non_empty(wire.thumbnail),
            resolutions: wire
                .resolutions
                .unwrap_or_default()
                .into_iter()
                .map(ResolutionOption::from)
                .collect(),
        }
    }
}

impl VideoInfo {
    /// Title, or a placeholder when the service sent none.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN_TITLE)
    }

    /// Platform key, empty when absent.
    #[must_use]
    pub fn platform_key(&self) -> &str {
        self.platform.as_deref().unwrap_or_default()
    }

    /// Uploader line for the preview card.
    #[must_use]
    pub fn uploader_line(&self) -> String {
        self.uploader
            .as_ref()
            .map(|u| format!("👤 {u}"))
            .unwrap_or_default()
    }

    /// Platform line for the preview card.
    #[must_use]
    pub fn platform_line(&self) -> String {
        self.platform
            .as_ref()
            .map(|p| format!("🌐 {p}"))
            .unwrap_or_default()
    }

    /// Duration line for the preview card.
    #[must_use]
    pub fn duration_line(&self) -> String {
        self.duration_secs
            .map(|d| format!("⏱ {}", format_duration(d)))
            .unwrap_or_default()
    }
}

/// What the download produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Video at the selected resolution.
    #[default]
    Video,
    /// Audio only; resolution is ignored.
    Audio,
}

impl MediaType {
    /// Wire value for the `media_type` form field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's current download choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadSelection {
    /// Video or audio.
    pub media_type: MediaType,
    /// Index into the displayed resolution options.
    pub resolution_index: usize,
}

impl DownloadSelection {
    /// Resolution choice is only interactive in video mode.
    #[must_use]
    pub const fn resolution_enabled(&self) -> bool {
        matches!(self.media_type, MediaType::Video)
    }
}

/// A download, built from the currently displayed selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    /// Trimmed source URL.
    pub url: String,
    /// Resolution value (label, or `best` for the fallback option).
    pub resolution: String,
    /// Server stream token, possibly empty.
    pub format_id: String,
    /// Video or audio.
    pub media_type: MediaType,
}

impl DownloadRequest {
    /// Hidden form fields in submission order.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, String); 4] {
        [
            ("url", self.url.clone()),
            ("resolution", self.resolution.clone()),
            ("format_id", self.format_id.clone()),
            ("media_type", self.media_type.as_str().to_string()),
        ]
    }
}

// =============================================================================
// Conversion flow
// =============================================================================

/// Broad family of a conversion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatCategory {
    /// Video container.
    Video,
    /// Audio-only format.
    Audio,
}

/// Supported conversion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionFormat {
    /// MPEG-4 video.
    Mp4,
    /// Matroska video.
    Mkv,
    /// AVI video.
    Avi,
    /// QuickTime video.
    Mov,
    /// WebM video.
    Webm,
    /// Flash video.
    Flv,
    /// MP3 audio.
    Mp3,
    /// AAC audio.
    Aac,
    /// WAV audio.
    Wav,
    /// Ogg Vorbis audio.
    Ogg,
    /// MPEG-4 audio.
    M4a,
    /// FLAC audio.
    Flac,
}

impl ConversionFormat {
    /// Every target, video formats first, in button order.
    pub const ALL: [Self; 12] = [
        Self::Mp4,
        Self::Mkv,
        Self::Avi,
        Self::Mov,
        Self::Webm,
        Self::Flv,
        Self::Mp3,
        Self::Aac,
        Self::Wav,
        Self::Ogg,
        Self::M4a,
        Self::Flac,
    ];

    /// Extension / wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Webm => "webm",
            Self::Flv => "flv",
            Self::Mp3 => "mp3",
            Self::Aac => "aac",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::M4a => "m4a",
            Self::Flac => "flac",
        }
    }

    /// Video or audio.
    #[must_use]
    pub const fn category(self) -> FormatCategory {
        match self {
            Self::Mp4 | Self::Mkv | Self::Avi | Self::Mov | Self::Webm | Self::Flv => {
                FormatCategory::Video
            }
            Self::Mp3 | Self::Aac | Self::Wav | Self::Ogg | Self::M4a | Self::Flac => {
                FormatCategory::Audio
            }
        }
    }

    /// MIME type used to type the saved blob.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Aac => "audio/aac",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::M4a => "audio/mp4",
            Self::Flac => "audio/flac",
            Self::Mp4 => "video/mp4",
            Self::Mkv => "video/x-matroska",
            Self::Avi => "video/x-msvideo",
            Self::Mov => "video/quicktime",
            Self::Webm => "video/webm",
            Self::Flv => "video/x-flv",
        }
    }
}

impl fmt::Display for ConversionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::validation(format!("Unsupported format '{s}'")))
    }
}

/// A local file chosen for conversion.
#[derive(Clone, PartialEq, Eq)]
pub struct ConversionFile {
    /// Original filename.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
    /// MIME type reported by the browser, if any.
    pub mime_type: Option<String>,
}

impl fmt::Debug for ConversionFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionFile")
            .field("name", &self.name)
            .field("size", &self.size())
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

impl ConversionFile {
    /// Create a file from its name and contents.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime_type: None,
        }
    }

    /// Attach the source MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Size for the file-info panel.
    #[must_use]
    pub fn display_size(&self) -> String {
        format_bytes(self.size())
    }

    /// Read a file from disk (native hosts).
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            Error::validation(format!("Failed to read {}: {e}", path.display()))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::validation(format!("Not a file: {}", path.display())))?;
        Ok(Self::new(name, bytes))
    }
}

/// A file plus the target format, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Source file.
    pub file: ConversionFile,
    /// Target format.
    pub format: ConversionFormat,
}

/// Successful conversion response.
#[derive(Clone, PartialEq, Eq)]
pub struct ConvertedMedia {
    /// Response body.
    pub bytes: Vec<u8>,
    /// Raw `Content-Disposition` header.
    pub content_disposition: Option<String>,
    /// Raw `Content-Type` header.
    pub content_type: Option<String>,
}

impl fmt::Debug for ConvertedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedMedia")
            .field("len", &self.bytes.len())
            .field("content_disposition", &self.content_disposition)
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl ConvertedMedia {
    /// Filename to save under.
    #[must_use]
    pub fn save_filename(&self, format: ConversionFormat) -> String {
        resolve_save_filename(self.content_disposition.as_deref(), format)
    }

    /// MIME type for the saved blob, preferring the server's.
    #[must_use]
    pub fn blob_type(&self, format: ConversionFormat) -> String {
        self.content_type
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format.mime_type().to_string())
    }
}
