use tabsplit_core::Money;

use crate::types::DraftItem;

/// Supplies the stand-in items used when no line item could be read.
pub trait PlaceholderItems: Send + Sync {
    fn items(&self) -> Vec<DraftItem>;
}

/// The fixed demo set: Coffee $4.50, Sandwich $8.99, Chips $2.50.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPlaceholders;

impl PlaceholderItems for FixedPlaceholders {
    fn items(&self) -> Vec<DraftItem> {
        vec![
            DraftItem::new("Coffee", Money::from_cents(450)),
            DraftItem::new("Sandwich", Money::from_cents(899)),
            DraftItem::new("Chips", Money::from_cents(250)),
        ]
    }
}

impl PlaceholderItems for Vec<DraftItem> {
    fn items(&self) -> Vec<DraftItem> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_placeholders_are_stable() {
        let items = FixedPlaceholders.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items, FixedPlaceholders.items());
        let sum: Money = items.iter().map(|i| i.price).sum();
        assert_eq!(sum, Money::from_cents(1599));
    }
}
