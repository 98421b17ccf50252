use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PersonId = Uuid;

/// A trip member. Only the identifier participates in settlement math;
/// the name exists for display and CLI lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_person_gets_unique_id() {
        let a = Person::new("Ana");
        let b = Person::new("Ana");
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "Ana");
    }
}
