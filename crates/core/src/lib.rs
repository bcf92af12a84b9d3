pub mod item;
pub mod money;
pub mod split;

pub use item::{all_assigned, ParticipantId, ReceiptItem};
pub use money::Money;
pub use split::{calc_totals, ParticipantTotals, SplitCalculator, SplitConfig, SplitError, UnassignedPolicy};
