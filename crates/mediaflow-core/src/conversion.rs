//! Conversion flow controller.
//!
//! Lifecycle `Idle → FileSelected → FormatSelected → Converting →
//! FormatSelected`. A successful conversion keeps the file and format so the
//! same file can be converted again to another target.

use tracing::{debug, info, warn};

use crate::api::MediaApi;
use crate::config::ClientConfig;
use crate::delivery::{DeliveryBackend, ObjectUrl, Timer};
use crate::error::{Error, Result};
use crate::media::{ConversionFile, ConversionFormat, ConversionJob, ConvertedMedia};
use crate::status::{BusyFlag, StatusMessage};

/// Where the conversion flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionPhase {
    /// No file chosen.
    Idle,
    /// A file is chosen, no target format yet.
    FileSelected,
    /// File and format are both set; convert is enabled.
    FormatSelected,
    /// An upload is in flight.
    Converting,
}

/// A conversion result handed to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedConversion {
    /// Name the file was saved under.
    pub filename: String,
    /// Object URL to release once the save has started.
    pub object_url: ObjectUrl,
}

/// State machine for the conversion workflow.
#[derive(Debug, Clone)]
pub struct ConversionController {
    config: ClientConfig,
    file: Option<ConversionFile>,
    format: Option<ConversionFormat>,
    busy: BusyFlag,
    status: Option<StatusMessage>,
}

impl ConversionController {
    /// Create an idle controller.
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self {
            config,
            file: None,
            format: None,
            busy: BusyFlag::new(),
            status: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ConversionPhase {
        if self.busy.is_busy() {
            ConversionPhase::Converting
        } else if self.file.is_none() {
            ConversionPhase::Idle
        } else if self.format.is_none() {
            ConversionPhase::FileSelected
        } else {
            ConversionPhase::FormatSelected
        }
    }

    /// The chosen file.
    #[must_use]
    pub const fn file(&self) -> Option<&ConversionFile> {
        self.file.as_ref()
    }

    /// The chosen target format.
    #[must_use]
    pub const fn format(&self) -> Option<ConversionFormat> {
        self.format
    }

    /// Conversion status line.
    #[must_use]
    pub const fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Whether an upload is in flight.
    #[must_use]
    pub const fn is_converting(&self) -> bool {
        self.busy.is_busy()
    }

    /// Whether the convert control is enabled.
    #[must_use]
    pub const fn can_convert(&self) -> bool {
        self.file.is_some() && self.format.is_some() && !self.busy.is_busy()
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Replace the chosen file. The chosen format is kept.
    pub fn select_file(&mut self, file: ConversionFile) -> Result<()> {
        self.ensure_idle("Conversion")?;
        info!("Selected {} ({} bytes)", file.name, file.size());
        self.file = Some(file);
        self.status = None;
        Ok(())
    }

    /// Take the first of several offered files (browse dialog or drop).
    ///
    /// Returns `false` when nothing was offered.
    pub fn select_first_file<I>(&mut self, files: I) -> Result<bool>
    where
        I: IntoIterator<Item = ConversionFile>,
    {
        let Some(file) = files.into_iter().next() else {
            debug!("Empty file offer ignored");
            return Ok(false);
        };
        self.select_file(file)?;
        Ok(true)
    }

    /// Clear file, format and status.
    pub fn remove_file(&mut self) -> Result<()> {
        self.ensure_idle("Conversion")?;
        debug!("File removed");
        self.file = None;
        self.format = None;
        self.status = None;
        Ok(())
    }

    /// Choose the target format.
    pub fn select_format(&mut self, format: ConversionFormat) {
        debug!("Target format: {}", format);
        self.format = Some(format);
    }

    /// Check preconditions, mark busy and return the job to upload.
    pub fn begin_conversion(&mut self) -> Result<ConversionJob> {
        let (Some(file), Some(format)) = (self.file.clone(), self.format) else {
            return Err(Error::validation(
                "Select a file and a target format first.",
            ));
        };
        self.busy.acquire("Conversion")?;
        self.status = Some(StatusMessage::info(format!(
            "⏳ Converting to .{}… please wait.",
            format.as_str().to_uppercase()
        )));
        info!("Converting {} to {}", file.name, format);
        Ok(ConversionJob { file, format })
    }

    /// Apply the upload result, saving the converted bytes on success.
    ///
    /// Busy is released in every outcome.
    pub fn complete_conversion<D: DeliveryBackend>(
        &mut self,
        job: &ConversionJob,
        result: Result<ConvertedMedia>,
        delivery: &D,
    ) -> Result<SavedConversion> {
        self.busy.release();

        let saved = result.and_then(|media| save_converted(delivery, job, &media));
        match saved {
            Ok(saved) => {
                info!("Saved conversion as {}", saved.filename);
                self.status = Some(StatusMessage::success(format!(
                    "✅ Done! Saved as {}",
                    saved.filename
                )));
                Ok(saved)
            }
            Err(e) => {
                warn!("Conversion of {} failed: {}", job.file.name, e);
                self.status = Some(StatusMessage::failure(&e));
                Err(e)
            }
        }
    }

    /// Upload, save the result and release its object URL after the
    /// configured delay.
    pub async fn submit_conversion<A, D, T>(
        &mut self,
        api: &A,
        delivery: &D,
        timer: &T,
    ) -> Result<String>
    where
        A: MediaApi,
        D: DeliveryBackend,
        T: Timer,
    {
        let job = self.begin_conversion()?;
        let result = api.convert(&job).await;
        let saved = self.complete_conversion(&job, result, delivery)?;

        timer.sleep(self.config.object_url_revoke_delay()).await;
        delivery.release_object_url(saved.object_url);
        Ok(saved.filename)
    }

    fn ensure_idle(&self, action: &'static str) -> Result<()> {
        if self.busy.is_busy() {
            return Err(Error::Busy(action));
        }
        Ok(())
    }
}

impl Default for ConversionController {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

/// Hand converted bytes to the browser under the resolved filename.
pub fn save_converted<D: DeliveryBackend>(
    delivery: &D,
    job: &ConversionJob,
    media: &ConvertedMedia,
) -> Result<SavedConversion> {
    let filename = media.save_filename(job.format);
    let content_type = media.blob_type(job.format);
    let object_url = delivery.save_blob(&media.bytes, &content_type, &filename)?;
    Ok(SavedConversion {
        filename,
        object_url,
    })
}
