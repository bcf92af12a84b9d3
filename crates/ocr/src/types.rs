use serde::{Deserialize, Serialize};
use tabsplit_core::{Money, ReceiptItem};

/// Axis-aligned box in image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// One span of text recognized by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    /// Recognizer confidence, conventionally 0.0–1.0.
    pub confidence: f32,
    #[serde(alias = "boundingBox")]
    pub bounding_box: BoundingBox,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, confidence: f32, bounding_box: BoundingBox) -> Self {
        Self { text: text.into(), confidence, bounding_box }
    }
}

/// Mean confidence over `fragments`, or `None` when there are none.
pub fn mean_confidence(fragments: &[TextFragment]) -> Option<f32> {
    if fragments.is_empty() {
        return None;
    }
    let sum: f32 = fragments.iter().map(|f| f.confidence).sum();
    Some(sum / fragments.len() as f32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftItem {
    pub name: String,
    pub price: Money,
}

impl DraftItem {
    pub fn new(name: &str, price: Money) -> Self {
        Self { name: name.to_string(), price }
    }
}

/// Machine-extracted, unreviewed receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDraft {
    pub merchant: String,
    /// Never empty: placeholder items stand in when nothing was detected.
    pub items: Vec<DraftItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub tip: Money,
    /// Mean confidence of the fragments the draft was built from.
    pub confidence: f32,
}

impl ReceiptDraft {
    /// Grand total: subtotal + tax + tip.
    pub fn total(&self) -> Money {
        self.subtotal + self.tax + self.tip
    }

    pub fn with_tip(self, tip: Money) -> Self {
        Self { tip, ..self }
    }

    /// Whether the draft's source text is too unreliable to accept as-is.
    pub fn needs_review(&self, min_confidence: f32) -> bool {
        self.confidence < min_confidence
    }

    /// Turn the draft items into assignable items with ids `item-0`, `item-1`, ….
    pub fn into_items(self) -> Vec<ReceiptItem> {
        self.items
            .into_iter()
            .enumerate()
            .map(|(i, item)| ReceiptItem::new(&format!("item-{i}"), &item.name, item.price))
            .collect()
    }
}
