use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PersonId;

pub type ItemId = Uuid;

/// A packing list entry: something the group needs a number of, with people
/// volunteering to bring some quantity each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// How many the group needs in total.
    pub needed: i64,
    /// Map of person id -> quantity they committed to bring.
    pub assigned: HashMap<PersonId, i64>,
    /// Manual "it's handled" override, independent of assignments.
    pub packed: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(name: impl Into<String>, needed: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            needed,
            assigned: HashMap::new(),
            packed: false,
            created_at: Utc::now(),
        }
    }

    /// Total quantity committed across all people.
    pub fn assigned_quantity(&self) -> i64 {
        self.assigned.values().sum()
    }

    /// An item is covered when explicitly marked packed, or when enough
    /// quantity has been claimed to meet the need.
    pub fn is_covered(&self) -> bool {
        self.packed || (self.needed > 0 && self.assigned_quantity() >= self.needed)
    }

    /// Set one person's committed quantity. Zero clears their commitment.
    /// Rejects totals that would exceed what the group needs.
    pub fn assign(&mut self, person: PersonId, quantity: i64) -> Result<(), AssignmentError> {
        if quantity < 0 {
            return Err(AssignmentError::NegativeQuantity { requested: quantity });
        }
        let others: i64 = self
            .assigned
            .iter()
            .filter(|(id, _)| **id != person)
            .map(|(_, qty)| qty)
            .sum();
        if others + quantity > self.needed {
            return Err(AssignmentError::ExceedsNeeded {
                needed: self.needed,
                already_assigned: others,
                requested: quantity,
            });
        }
        if quantity == 0 {
            self.assigned.remove(&person);
        } else {
            self.assigned.insert(person, quantity);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    NegativeQuantity {
        requested: i64,
    },
    ExceedsNeeded {
        needed: i64,
        already_assigned: i64,
        requested: i64,
    },
}

impl std::fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentError::NegativeQuantity { requested } => {
                write!(f, "Quantity cannot be negative (got {})", requested)
            }
            AssignmentError::ExceedsNeeded {
                needed,
                already_assigned,
                requested,
            } => {
                write!(
                    f,
                    "Only {} needed ({} already assigned, {} requested)",
                    needed, already_assigned, requested
                )
            }
        }
    }
}

impl std::error::Error for AssignmentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_starts_unassigned() {
        let item = Item::new("Tent", 2);
        assert_eq!(item.assigned_quantity(), 0);
        assert!(!item.is_covered());
    }

    #[test]
    fn test_assign_accumulates_across_people() {
        let mut item = Item::new("Chairs", 6);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        item.assign(a, 2).unwrap();
        item.assign(b, 3).unwrap();
        assert_eq!(item.assigned_quantity(), 5);
        assert!(!item.is_covered());

        item.assign(b, 4).unwrap(); // Replaces b's 3, not additive
        assert_eq!(item.assigned_quantity(), 6);
        assert!(item.is_covered());
    }

    #[test]
    fn test_assign_rejects_over_commitment() {
        let mut item = Item::new("Grill", 1);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        item.assign(a, 1).unwrap();
        let err = item.assign(b, 1).unwrap_err();
        assert!(matches!(err, AssignmentError::ExceedsNeeded { .. }));
    }

    #[test]
    fn test_assign_zero_clears_commitment() {
        let mut item = Item::new("Table", 1);
        let a = Uuid::new_v4();

        item.assign(a, 1).unwrap();
        item.assign(a, 0).unwrap();
        assert!(item.assigned.is_empty());
    }

    #[test]
    fn test_assign_rejects_negative() {
        let mut item = Item::new("Lamp", 1);
        let err = item.assign(Uuid::new_v4(), -1).unwrap_err();
        assert!(matches!(err, AssignmentError::NegativeQuantity { .. }));
    }

    #[test]
    fn test_packed_overrides_assignments() {
        let mut item = Item::new("Firewood", 10);
        assert!(!item.is_covered());
        item.packed = true;
        assert!(item.is_covered());
    }
}
