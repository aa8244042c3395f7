//! Upload-and-analyze workflow state.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::ImageFile;
use crate::api::{BackendClient, DiagnosisResult};
use crate::error::DermxError;
use crate::Result;

/// Notice shown when a non-image file is offered.
pub const REJECTION_NOTICE: &str = "Please upload an image file";

/// State of one diagnosis upload.
///
/// Tracks drag hover, the selected image and its preview, and the last
/// result or error. `analyze` holds the state exclusively while the request
/// is in flight, so there is no observable "analyzing" phase.
#[derive(Debug, Default)]
pub struct UploadState {
    dragging: bool,
    selected: Option<ImageFile>,
    preview: Option<String>,
    result: Option<DiagnosisResult>,
    error: Option<String>,
    notice: Option<String>,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_enter(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// Handle a drop. Only the first file is considered.
    pub fn drop_paths(&mut self, paths: &[PathBuf]) -> Result<bool> {
        self.dragging = false;
        match paths.first() {
            Some(path) => self.select_path(path),
            None => Ok(false),
        }
    }

    /// Offer a file from disk. See [`select_bytes`](Self::select_bytes).
    pub fn select_path(&mut self, path: &Path) -> Result<bool> {
        match ImageFile::from_path(path) {
            Ok(image) => Ok(self.accept(image)),
            Err(DermxError::InvalidImage(reason)) => Ok(self.reject(&reason)),
            Err(e) => Err(e),
        }
    }

    /// Offer in-memory content.
    ///
    /// Returns `true` if it was accepted. A non-image leaves the image state
    /// as it was and sets [`REJECTION_NOTICE`].
    pub fn select_bytes(&mut self, name: &str, bytes: Vec<u8>) -> bool {
        match ImageFile::from_bytes(name, bytes) {
            Ok(image) => self.accept(image),
            Err(e) => self.reject(&e.to_string()),
        }
    }

    fn accept(&mut self, image: ImageFile) -> bool {
        debug!(name = image.name(), mime = image.mime(), "image selected");
        self.preview = Some(image.preview_data_url());
        self.selected = Some(image);
        self.notice = None;
        true
    }

    fn reject(&mut self, reason: &str) -> bool {
        warn!(reason, "rejected non-image upload");
        self.notice = Some(REJECTION_NOTICE.to_string());
        false
    }

    /// Upload the selected image and record the outcome.
    ///
    /// Errors are returned and also kept as display text in
    /// [`error`](Self::error).
    pub async fn analyze(
        &mut self,
        backend: &BackendClient,
        token: Option<&str>,
    ) -> Result<DiagnosisResult> {
        self.error = None;

        let outcome = match &self.selected {
            Some(image) => backend.analyze_image(image, token).await,
            None => Err(DermxError::NoImageSelected),
        };

        match outcome {
            Ok(result) => {
                self.result = Some(result.clone());
                Ok(result)
            }
            Err(e) => {
                self.error = Some(match &e {
                    DermxError::AnalysisFailed(message) => message.clone(),
                    other => other.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Start over: drop the image, its preview and the result.
    pub fn reset(&mut self) {
        self.selected = None;
        self.preview = None;
        self.result = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn selected(&self) -> Option<&ImageFile> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn result(&self) -> Option<&DiagnosisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}
