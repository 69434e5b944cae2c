//! Stage analyzers: each wraps exactly one class of model call plus strict
//! output validation.

pub mod consistency;
pub mod error;
pub mod extraction;
pub mod image;
mod parse;
pub mod text;
pub mod types;

pub use consistency::{ConsistencyStage, CONSISTENCY_INSTRUCTION};
pub use error::StageError;
pub use extraction::{ExtractionStage, OCR_INSTRUCTION};
pub use image::{ImageStage, IMAGE_INSTRUCTION};
pub use text::{TextStage, INSUFFICIENT_TEXT_FLAG, TEXT_INSTRUCTION};
pub use types::{
    BoundingBox, ConsistencyAnalysis, ExtractionResult, ImageAnalysis, ImageAssessment,
    ImageVerdict, ScreenshotRef, TextAnalysis,
};
