use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::extract::{ExtractError, Extractor};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::{mean_confidence, ReceiptDraft, TextFragment};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Primary fragments with a lower mean confidence are discarded in favour
    /// of the fallback recognizer.
    pub min_confidence: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { min_confidence: 0.7 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanSource {
    Primary,
    Fallback,
}

/// The result of a single receipt scan.
#[derive(Debug)]
pub struct ScanResult {
    /// Which recognizer the draft was built from.
    pub source: ScanSource,
    pub fragments: Vec<TextFragment>,
    pub draft: ReceiptDraft,
}

/// Orchestrates: primary OCR → confidence gate → (fallback OCR) → extract.
pub struct ReceiptPipeline<P: OcrBackend, F: OcrBackend> {
    primary: P,
    fallback: F,
    extractor: Extractor,
    config: PipelineConfig,
}

impl<P: OcrBackend, F: OcrBackend> ReceiptPipeline<P, F> {
    pub fn new(primary: P, fallback: F, config: PipelineConfig) -> Self {
        Self { primary, fallback, extractor: Extractor::default(), config }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ScanResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes).await
    }

    /// Process raw image bytes (from camera capture or file read).
    pub async fn process_bytes(&self, data: &[u8]) -> Result<ScanResult, PipelineError> {
        let (source, fragments) = match self.recognize_primary(data) {
            Some(fragments) => (ScanSource::Primary, fragments),
            None => (ScanSource::Fallback, self.fallback.recognize(data)?),
        };

        let draft = self.extractor.extract(&fragments)?;
        tracing::info!(
            source = ?source,
            fragments = fragments.len(),
            items = draft.items.len(),
            confidence = draft.confidence,
            "Receipt scanned"
        );

        Ok(ScanResult { source, fragments, draft })
    }

    /// Primary fragments, or `None` when they should be replaced by the fallback.
    fn recognize_primary(&self, data: &[u8]) -> Option<Vec<TextFragment>> {
        let fragments = match self.primary.recognize(data) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Primary recognizer failed, using fallback: {e}");
                return None;
            }
        };
        match mean_confidence(&fragments) {
            Some(c) if c >= self.config.min_confidence => Some(fragments),
            Some(c) => {
                tracing::warn!(
                    "Primary confidence too low ({c:.2} < {:.2}), using fallback",
                    self.config.min_confidence
                );
                None
            }
            None => {
                tracing::warn!("Primary recognizer found no text, using fallback");
                None
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{DemoRecognizer, MockRecognizer};
    use crate::types::BoundingBox;
    use tabsplit_core::Money;

    struct BrokenRecognizer;

    impl OcrBackend for BrokenRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
            Err(OcrError::Engine("model not loaded".to_string()))
        }
    }

    fn sample_store(confidence: f32) -> MockRecognizer {
        MockRecognizer::new(vec![
            TextFragment::new("Sample Store", confidence, BoundingBox::new(40.0, 20.0, 150.0, 25.0)),
            TextFragment::new("Sample Item $10.99", confidence, BoundingBox::new(40.0, 120.0, 200.0, 25.0)),
        ])
    }

    fn pipeline<P: OcrBackend>(primary: P) -> ReceiptPipeline<P, MockRecognizer> {
        ReceiptPipeline::new(primary, sample_store(0.5), PipelineConfig::default())
    }

    #[tokio::test]
    async fn confident_primary_is_used() {
        let result = pipeline(DemoRecognizer::new(3)).process_bytes(b"img").await.unwrap();
        assert_eq!(result.source, ScanSource::Primary);
        assert!(result.draft.confidence >= 0.7);
        assert!(result.draft.items.len() >= 2);
    }

    #[tokio::test]
    async fn low_confidence_switches_to_fallback() {
        let result = pipeline(sample_store(0.4)).process_bytes(b"img").await.unwrap();
        assert_eq!(result.source, ScanSource::Fallback);
        assert_eq!(result.draft.merchant, "Sample Store");
        assert_eq!(result.draft.subtotal, Money::from_cents(1099));
    }

    #[tokio::test]
    async fn primary_error_switches_to_fallback() {
        let result = pipeline(BrokenRecognizer).process_bytes(b"img").await.unwrap();
        assert_eq!(result.source, ScanSource::Fallback);
    }

    #[tokio::test]
    async fn empty_primary_switches_to_fallback() {
        let result = pipeline(MockRecognizer::new(vec![])).process_bytes(b"img").await.unwrap();
        assert_eq!(result.source, ScanSource::Fallback);
    }

    #[tokio::test]
    async fn empty_fallback_is_an_extract_error() {
        let p = ReceiptPipeline::new(BrokenRecognizer, MockRecognizer::new(vec![]), PipelineConfig::default());
        let err = p.process_bytes(b"img").await.unwrap_err();
        assert!(matches!(err, PipelineError::Extract(ExtractError::NoFragments)));
    }

    #[tokio::test]
    async fn failing_fallback_is_an_ocr_error() {
        let p = ReceiptPipeline::new(BrokenRecognizer, BrokenRecognizer, PipelineConfig::default());
        assert!(matches!(p.process_bytes(b"img").await, Err(PipelineError::Ocr(_))));
    }

    #[tokio::test]
    async fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let result = pipeline(DemoRecognizer::new(1)).process_file(&path).await.unwrap();
        assert_eq!(result.source, ScanSource::Primary);
    }

    #[tokio::test]
    async fn process_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline(DemoRecognizer::new(1))
            .process_file(&dir.path().join("missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
