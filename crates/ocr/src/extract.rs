use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Match, Regex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabsplit_core::Money;
use thiserror::Error;

use crate::placeholder::{FixedPlaceholders, PlaceholderItems};
use crate::rows::{group_into_rows, Row};
use crate::types::{mean_confidence, DraftItem, ReceiptDraft, TextFragment};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_currency,
    r"\$(\d+(?:\.\d+)?)");
re!(re_subtotal,
    r"(?i)subtotal[:\s]*\$?(\d+(?:\.\d+)?)");
re!(re_tax,
    r"(?i)\btax[:\s]*\$?(\d+(?:\.\d+)?)");

// ── Errors & config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Nothing to average a confidence over.
    #[error("could not read receipt, please retake or enter manually")]
    NoFragments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Fragments above this `y` (pixels) are merchant-name candidates.
    pub header_max_y: f32,
    /// Applied to the subtotal when no tax line is found.
    pub default_tax_rate: Decimal,
    pub fallback_merchant: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            header_max_y: 100.0,
            default_tax_rate: Decimal::new(8, 2),
            fallback_merchant: "Restaurant".to_string(),
        }
    }
}

// ── Public extraction API ─────────────────────────────────────────────────────

/// Builds a [`ReceiptDraft`] from unordered OCR fragments.
pub struct Extractor {
    config: ExtractorConfig,
    placeholders: Box<dyn PlaceholderItems>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config, placeholders: Box::new(FixedPlaceholders) }
    }

    pub fn with_placeholders(mut self, placeholders: impl PlaceholderItems + 'static) -> Self {
        self.placeholders = Box::new(placeholders);
        self
    }

    /// Extract merchant, items, subtotal, tax and confidence.
    ///
    /// Soft misses fall back to defaults; only an empty fragment list fails.
    pub fn extract(&self, fragments: &[TextFragment]) -> Result<ReceiptDraft, ExtractError> {
        let confidence = mean_confidence(fragments).ok_or(ExtractError::NoFragments)?;

        let rows = group_into_rows(fragments);
        let merchant = self.extract_merchant(fragments);

        let mut items = extract_items(&rows);
        if items.is_empty() {
            tracing::debug!(rows = rows.len(), "No line items detected; using placeholders");
            items = within_range(self.placeholders.items());
        }

        let all_text = fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let subtotal = find_labeled_amount(re_subtotal(), &all_text).unwrap_or_else(|| {
            tracing::debug!("No subtotal line; summing items");
            items.iter().map(|i| i.price).sum()
        });
        let tax = find_labeled_amount(re_tax(), &all_text).unwrap_or_else(|| {
            tracing::debug!(rate = %self.config.default_tax_rate, "No tax line; applying default rate");
            subtotal.percent(self.config.default_tax_rate).unwrap_or_else(|| {
                tracing::warn!(%subtotal, "Default tax overflows; leaving tax at zero");
                Money::zero()
            })
        });

        Ok(ReceiptDraft {
            merchant,
            items,
            subtotal,
            tax,
            tip: Money::zero(),
            confidence,
        })
    }

    // ── Merchant ──────────────────────────────────────────────────────────────

    fn extract_merchant(&self, fragments: &[TextFragment]) -> String {
        fragments
            .iter()
            .find(|f| {
                f.text.chars().count() > 3
                    && f.bounding_box.y < self.config.header_max_y
                    && !re_currency().is_match(&f.text)
            })
            .map(|f| f.text.clone())
            .unwrap_or_else(|| {
                tracing::debug!("No merchant candidate in header");
                self.config.fallback_merchant.clone()
            })
    }
}

// ── Items ─────────────────────────────────────────────────────────────────────

fn extract_items(rows: &[Row]) -> Vec<DraftItem> {
    within_range(rows.iter().filter_map(|row| item_from_line(&row.text())))
}

/// Keep items in order while their running total stays representable.
fn within_range(items: impl IntoIterator<Item = DraftItem>) -> Vec<DraftItem> {
    let mut total = Money::zero();
    items
        .into_iter()
        .filter(|item| match total.checked_add(item.price) {
            Some(next) => {
                total = next;
                true
            }
            None => {
                tracing::debug!(name = %item.name, price = %item.price, "Skipping item; total overflows");
                false
            }
        })
        .collect()
}

/// A line is an item when it carries a price and is not a total or tax line.
fn item_from_line(line: &str) -> Option<DraftItem> {
    let m = find_currency(line)?;

    let lower = line.to_lowercase();
    if lower.contains("total") || lower.contains("tax") {
        return None;
    }

    let Some(price) = parse_amount(&m) else {
        tracing::debug!(line, "Skipping unparseable amount");
        return None;
    };

    let name = format!("{}{}", &line[..m.start()], &line[m.end()..]);
    let name = name.trim();
    if name.chars().count() <= 1 || !price.is_positive() {
        return None;
    }
    Some(DraftItem::new(name, price))
}

// ── Amount helpers ────────────────────────────────────────────────────────────

/// First `$<digits>[.<digits>]` in `text`.
pub fn find_currency(text: &str) -> Option<Match<'_>> {
    re_currency().find(text)
}

fn parse_amount(m: &Match<'_>) -> Option<Money> {
    parse_amount_str(m.as_str().trim_start_matches('$'))
}

/// Amount captured by `label` (group 1), if the label occurs.
fn find_labeled_amount(label: &Regex, text: &str) -> Option<Money> {
    let c = label.captures(text)?;
    parse_amount_str(c.get(1)?.as_str())
}

fn parse_amount_str(s: &str) -> Option<Money> {
    Decimal::from_str(s).ok().map(Money::from_decimal)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
