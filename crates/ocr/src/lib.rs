pub mod extract;
pub mod pipeline;
pub mod placeholder;
pub mod recognizer;
pub mod rows;
pub mod types;

pub use extract::{find_currency, ExtractError, Extractor, ExtractorConfig};
pub use pipeline::{PipelineConfig, PipelineError, ReceiptPipeline, ScanResult, ScanSource};
pub use placeholder::{FixedPlaceholders, PlaceholderItems};
pub use recognizer::{DemoRecognizer, MockRecognizer, OcrBackend, OcrError};
pub use rows::{group_into_rows, Row};
pub use types::{mean_confidence, BoundingBox, DraftItem, ReceiptDraft, TextFragment};
