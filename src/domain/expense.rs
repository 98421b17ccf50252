use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, PersonId};

pub type ExpenseId = Uuid;

/// A shared expense: one person paid, a set of people benefited.
///
/// `shared_by` is semantically a set of person ids. An empty set is a
/// sentinel meaning "shared by everyone on the trip", evaluated lazily
/// against the people list current at settlement time - not frozen when the
/// expense was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    /// Non-negative currency value.
    pub amount: Amount,
    /// Who fronted the money.
    pub payer: PersonId,
    /// Who the cost is split among; empty means everyone.
    pub shared_by: Vec<PersonId>,
    /// When the money was spent. Display and ordering only; settlement
    /// math ignores it.
    pub spent_at: DateTime<Utc>,
    /// When we recorded this expense in the system.
    pub recorded_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        description: impl Into<String>,
        amount: Amount,
        payer: PersonId,
        spent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            payer,
            shared_by: Vec::new(),
            spent_at,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_shared_by(mut self, shared_by: Vec<PersonId>) -> Self {
        self.shared_by = shared_by;
        self
    }

    /// Returns true when the expense is split among everyone rather than a
    /// named subset.
    pub fn is_shared_by_all(&self) -> bool {
        self.shared_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_expense_defaults_to_shared_by_all() {
        let payer = Uuid::new_v4();
        let expense = Expense::new("Ice", 12.5, payer, Utc::now());

        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.payer, payer);
        assert!(expense.is_shared_by_all());
    }

    #[test]
    fn test_with_shared_by_marks_subset() {
        let payer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let expense =
            Expense::new("Fuel", 40.0, payer, Utc::now()).with_shared_by(vec![payer, other]);

        assert!(!expense.is_shared_by_all());
        assert_eq!(expense.shared_by.len(), 2);
    }
}
