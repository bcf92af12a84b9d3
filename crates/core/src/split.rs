use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::item::{ParticipantId, ReceiptItem};
use super::money::Money;

/// Amount owed per participant, rounded to the cent.
pub type ParticipantTotals = BTreeMap<ParticipantId, Money>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("cannot split a zero-cost receipt")]
    ZeroSubtotal,
    #[error("tax and tip must not be negative (tax={tax}, tip={tip})")]
    NegativeAdjustment { tax: Money, tip: Money },
    #[error("item '{0}' has a negative price")]
    NegativePrice(String),
    #[error("receipt amounts are too large to split")]
    AmountOverflow,
}

/// What happens to items nobody was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedPolicy {
    /// Counted in the subtotal used for the tax/tip factor, billed to nobody.
    /// Participant totals can then sum to less than the receipt total.
    #[default]
    Absorb,
    /// Removed from the bill before the factor is computed, so assigned
    /// participants carry all of the tax and tip.
    Exclude,
    /// Billed in full to the given participant.
    DefaultPayer(ParticipantId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub unassigned: UnassignedPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct SplitCalculator {
    policy: UnassignedPolicy,
}

impl SplitCalculator {
    pub fn new(policy: UnassignedPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(config.unassigned.clone())
    }

    pub fn policy(&self) -> &UnassignedPolicy {
        &self.policy
    }

    /// Each participant's item share scaled by `(subtotal + tax + tip) / subtotal`.
    ///
    /// Shared items are divided evenly among their assignees before scaling.
    /// The receipt subtotal (all items, assigned or not) must be positive.
    pub fn calc_totals(
        &self,
        items: &[ReceiptItem],
        tax: Money,
        tip: Money,
    ) -> Result<ParticipantTotals, SplitError> {
        if tax.is_negative() || tip.is_negative() {
            return Err(SplitError::NegativeAdjustment { tax, tip });
        }
        if let Some(item) = items.iter().find(|i| i.price.is_negative()) {
            return Err(SplitError::NegativePrice(item.name.clone()));
        }

        let subtotal = items
            .iter()
            .try_fold(Money::zero(), |acc, i| acc.checked_add(i.price))
            .ok_or(SplitError::AmountOverflow)?;
        if !subtotal.is_positive() {
            return Err(SplitError::ZeroSubtotal);
        }

        let mut shares: BTreeMap<ParticipantId, Decimal> = BTreeMap::new();
        let mut unassigned = Money::zero();

        for item in items {
            let price = item.price.as_decimal();
            if item.assigned_to.is_empty() {
                unassigned += item.price;
                if let UnassignedPolicy::DefaultPayer(payer) = &self.policy {
                    accrue(&mut shares, payer, price)?;
                }
                continue;
            }
            let each = price / Decimal::from(item.assigned_to.len());
            for participant in &item.assigned_to {
                accrue(&mut shares, participant, each)?;
            }
        }

        if unassigned.is_positive() {
            tracing::debug!(%unassigned, policy = ?self.policy, "Receipt has unassigned items");
        }

        let billable = match self.policy {
            UnassignedPolicy::Exclude => subtotal - unassigned,
            _ => subtotal,
        };
        if !billable.is_positive() {
            // Only reachable under `Exclude` when nothing is assigned.
            return Ok(ParticipantTotals::new());
        }

        let grand_total = billable
            .checked_add(tax)
            .and_then(|t| t.checked_add(tip))
            .ok_or(SplitError::AmountOverflow)?;
        let factor = grand_total
            .as_decimal()
            .checked_div(billable.as_decimal())
            .ok_or(SplitError::AmountOverflow)?;

        shares
            .into_iter()
            .map(|(participant, share)| {
                let owed = share.checked_mul(factor).ok_or(SplitError::AmountOverflow)?;
                Ok((participant, Money::from_decimal(owed)))
            })
            .collect()
    }
}

fn accrue(
    shares: &mut BTreeMap<ParticipantId, Decimal>,
    participant: &ParticipantId,
    amount: Decimal,
) -> Result<(), SplitError> {
    let share = shares.entry(participant.clone()).or_default();
    *share = share.checked_add(amount).ok_or(SplitError::AmountOverflow)?;
    Ok(())
}

/// [`SplitCalculator::calc_totals`] with the default [`UnassignedPolicy::Absorb`].
pub fn calc_totals(
    items: &[ReceiptItem],
    tax: Money,
    tip: Money,
) -> Result<ParticipantTotals, SplitError> {
    SplitCalculator::default().calc_totals(items, tax, tip)
}
