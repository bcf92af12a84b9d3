use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        ParticipantId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        ParticipantId(s.to_string())
    }
}

/// A reviewed receipt line, ready to be assigned to participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub assigned_to: BTreeSet<ParticipantId>,
    /// Marks the item as shared evenly. Informational: the split already
    /// follows from `assigned_to`.
    #[serde(default)]
    pub split: bool,
}

impl ReceiptItem {
    pub fn new(id: &str, name: &str, price: Money) -> Self {
        ReceiptItem {
            id: id.to_string(),
            name: name.to_string(),
            price,
            assigned_to: BTreeSet::new(),
            split: false,
        }
    }

    pub fn assigned<I, P>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        self.assigned_to = participants.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_assigned(&self) -> bool {
        !self.assigned_to.is_empty()
    }

    /// Adds the participant if absent, removes it otherwise.
    pub fn toggle_assignee(&mut self, participant: ParticipantId) {
        if !self.assigned_to.remove(&participant) {
            self.assigned_to.insert(participant);
        }
    }

    pub fn split_evenly<I>(&mut self, participants: I)
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        self.assigned_to = participants.into_iter().collect();
        self.split = true;
    }
}

/// Whether every item has at least one assignee.
pub fn all_assigned(items: &[ReceiptItem]) -> bool {
    items.iter().all(ReceiptItem::is_assigned)
}
