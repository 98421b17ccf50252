use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Person, Settlement};

/// Per-person line in the balance sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub person: Person,
    /// Positive = owed money, negative = owes money.
    pub balance: Amount,
}

/// The settlement plan: balances plus the transfers that discharge them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub balances: Vec<BalanceEntry>,
    pub settlements: Vec<Settlement>,
}

/// Spending overview for the whole trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub expense_count: usize,
    pub total_spent: Amount,
    /// The person who has fronted the most money so far, if anyone has.
    pub top_payer: Option<PayerTotal>,
    /// Paid totals per person, largest first.
    pub paid_totals: Vec<PayerTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayerTotal {
    pub person: Person,
    pub paid: Amount,
}

/// Packing list progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingReport {
    pub total_items: usize,
    /// Items either marked packed or fully claimed.
    pub covered_items: usize,
    /// 0-100, rounded. Zero items counts as zero progress.
    pub progress_percent: u8,
    /// Quantities each person committed to carry, heaviest load first.
    pub loads: Vec<PersonLoad>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonLoad {
    pub person: Person,
    pub quantity: i64,
}
