//! Skin-image diagnosis.
//!
//! Client-side image validation and the upload workflow. Non-image input is
//! rejected here, before any request is made.

mod image;
mod upload;

pub use image::{mime_from_extension, sniff_mime, ImageFile};
pub use upload::{UploadState, REJECTION_NOTICE};

pub use crate::api::{DiagnosisResult, RankedCondition};
