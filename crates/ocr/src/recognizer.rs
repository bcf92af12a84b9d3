use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::types::{BoundingBox, TextFragment};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// Abstraction over an OCR engine.
/// Implementations accept raw image bytes and return positioned text fragments.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<TextFragment>, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a preset fragment list regardless of the image.
pub struct MockRecognizer {
    pub fragments: Vec<TextFragment>,
}

impl MockRecognizer {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self { fragments }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        Ok(self.fragments.clone())
    }
}

// ── Demo backend ──────────────────────────────────────────────────────────────

const DEMO_MERCHANTS: &[&str] = &["COFFEE BEAN", "STARBUCKS", "LOCAL CAFE", "BURGER PALACE", "PIZZA HUT"];

/// (name, min cents, max cents)
const DEMO_MENU: &[(&str, i64, i64)] = &[
    ("Coffee", 300, 600),
    ("Latte", 400, 600),
    ("Sandwich", 700, 1100),
    ("Muffin", 300, 500),
    ("Chips", 200, 300),
    ("Soda", 250, 350),
];

/// Synthesizes a plausible receipt layout: merchant header, 2–4 priced items,
/// a subtotal line and an 8% tax line.
///
/// Output depends only on `seed`, so the same recognizer always produces the
/// same fragments.
#[derive(Debug, Clone, Copy)]
pub struct DemoRecognizer {
    pub seed: u64,
}

impl DemoRecognizer {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn generate(&self) -> Vec<TextFragment> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut fragments = Vec::new();
        let mut y = 50.0;

        let merchant = DEMO_MERCHANTS[rng.gen_range(0..DEMO_MERCHANTS.len())];
        fragments.push(TextFragment::new(merchant, 0.98, BoundingBox::new(100.0, y, 200.0, 30.0)));
        y += 50.0;

        let count = rng.gen_range(2..=4);
        let mut subtotal_cents = 0;
        for &(name, lo, hi) in DEMO_MENU.iter().take(count) {
            let cents = rng.gen_range(lo..=hi);
            subtotal_cents += cents;
            fragments.push(TextFragment::new(
                name,
                rng.gen_range(0.93..0.98),
                BoundingBox::new(50.0, y, 100.0, 25.0),
            ));
            fragments.push(TextFragment::new(
                format_dollars(cents),
                rng.gen_range(0.95..0.99),
                BoundingBox::new(180.0, y, 60.0, 25.0),
            ));
            y += 30.0;
        }
        y += 20.0;

        // 8% rounded half-up to the cent.
        let tax_cents = (subtotal_cents * 8 + 50) / 100;
        for (label, cents, conf) in [("Subtotal:", subtotal_cents, 0.92), ("Tax:", tax_cents, 0.94)] {
            fragments.push(TextFragment::new(label, conf, BoundingBox::new(50.0, y, 100.0, 25.0)));
            fragments.push(TextFragment::new(
                format_dollars(cents),
                0.97,
                BoundingBox::new(180.0, y, 70.0, 25.0),
            ));
            y += 30.0;
        }

        fragments
    }
}

impl OcrBackend for DemoRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        Ok(self.generate())
    }
}

fn format_dollars(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
