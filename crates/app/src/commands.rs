use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabsplit_core::{all_assigned, Money, ParticipantTotals, ReceiptItem, SplitCalculator};
use tabsplit_ocr::{DemoRecognizer, Extractor, ReceiptDraft, ReceiptPipeline, TextFragment};

use crate::config::Settings;

/// Input document for `tabsplit split`.
#[derive(Debug, Deserialize)]
pub struct SplitRequest {
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub tip: Money,
}

#[derive(Debug, Serialize)]
pub struct DemoOutput {
    pub source: tabsplit_ocr::ScanSource,
    pub draft: ReceiptDraft,
    pub total: Money,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

pub fn extract(settings: &Settings, fragments_path: &Path) -> anyhow::Result<ReceiptDraft> {
    let fragments: Vec<TextFragment> = read_json(fragments_path)?;
    let draft = Extractor::new(settings.extract.clone()).extract(&fragments)?;
    if draft.needs_review(settings.pipeline.min_confidence) {
        tracing::warn!(
            "Low confidence ({:.2}); review the draft or enter the receipt manually",
            draft.confidence
        );
    }
    Ok(draft)
}

pub fn split(settings: &Settings, request_path: &Path) -> anyhow::Result<ParticipantTotals> {
    let request: SplitRequest = read_json(request_path)?;
    if !all_assigned(&request.items) {
        tracing::warn!(policy = ?settings.split.unassigned, "Some items are not assigned to anyone");
    }
    let totals = SplitCalculator::from_config(&settings.split).calc_totals(
        &request.items,
        request.tax,
        request.tip,
    )?;
    Ok(totals)
}

pub async fn demo(settings: &Settings, seed: u64) -> anyhow::Result<DemoOutput> {
    let pipeline = ReceiptPipeline::new(
        DemoRecognizer::new(seed),
        DemoRecognizer::new(seed.wrapping_add(1)),
        settings.pipeline.clone(),
    )
    .with_extractor(Extractor::new(settings.extract.clone()));

    let result = pipeline.process_bytes(&[]).await?;
    let total = result.draft.total();
    Ok(DemoOutput { source: result.source, draft: result.draft, total })
}
