use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{
    Amount, AssignmentError, Expense, ExpenseId, Item, Person, PersonId, calculate_settlements,
    compute_balances, round_to_cents,
};
use crate::storage::Repository;

use super::{
    AppError, BalanceEntry, ExpenseSummary, PackingReport, PayerTotal, PersonLoad, SettlementPlan,
};

/// Application service providing high-level operations for the trip.
/// This is the primary interface for any client (CLI, tests, future UIs).
pub struct TripService {
    repo: Repository,
}

/// Result of recording an expense, with names resolved for display.
pub struct ExpenseRecord {
    pub expense: Expense,
    pub payer_name: String,
    pub participant_names: Vec<String>,
}

/// Result of deleting an expense. The payer's name is `None` when they have
/// already left the trip.
pub struct RemovedExpense {
    pub expense: Expense,
    pub payer_name: Option<String>,
}

impl TripService {
    /// Create a new trip service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // People operations
    // ========================

    /// Add a person to the trip.
    pub async fn add_person(&self, name: String) -> Result<Person, AppError> {
        if self.repo.get_person_by_name(&name).await?.is_some() {
            return Err(AppError::PersonAlreadyExists(name));
        }

        let person = Person::new(name);
        self.repo.save_person(&person).await?;
        Ok(person)
    }

    /// Get a person by name.
    pub async fn get_person(&self, name: &str) -> Result<Person, AppError> {
        self.repo
            .get_person_by_name(name)
            .await?
            .ok_or_else(|| AppError::PersonNotFound(name.to_string()))
    }

    /// List everyone on the trip.
    pub async fn list_people(&self) -> Result<Vec<Person>, AppError> {
        Ok(self.repo.list_people().await?)
    }

    /// Remove a person from the trip.
    ///
    /// Expenses that reference the removed id are left untouched: the
    /// settlement engine drops their contributions from then on, and
    /// expenses shared by everyone simply re-split among whoever remains.
    pub async fn remove_person(&self, name: &str) -> Result<Person, AppError> {
        let person = self.get_person(name).await?;
        self.repo.delete_person(person.id).await?;
        Ok(person)
    }

    /// Get a map of person ids to names (useful for display).
    pub async fn person_names(&self) -> Result<HashMap<PersonId, String>, AppError> {
        let people = self.repo.list_people().await?;
        Ok(people.into_iter().map(|p| (p.id, p.name)).collect())
    }

    // ========================
    // Expense operations
    // ========================

    /// Record a shared expense. An empty participant list means the cost is
    /// shared by everyone on the trip at settlement time.
    pub async fn add_expense(
        &self,
        description: String,
        amount: Amount,
        payer_name: &str,
        participant_names: &[String],
        spent_at: DateTime<Utc>,
    ) -> Result<ExpenseRecord, AppError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::InvalidAmount(
                "Amount must be a positive number".to_string(),
            ));
        }

        let payer = self.get_person(payer_name).await?;

        let mut shared_by = Vec::with_capacity(participant_names.len());
        let mut resolved_names = Vec::with_capacity(participant_names.len());
        for name in participant_names {
            let person = self.get_person(name).await?;
            shared_by.push(person.id);
            resolved_names.push(person.name);
        }

        let expense =
            Expense::new(description, amount, payer.id, spent_at).with_shared_by(shared_by);
        self.repo.save_expense(&expense).await?;

        Ok(ExpenseRecord {
            expense,
            payer_name: payer.name,
            participant_names: resolved_names,
        })
    }

    /// List all expenses, oldest first.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>, AppError> {
        Ok(self.repo.list_expenses().await?)
    }

    /// Delete an expense.
    pub async fn remove_expense(&self, id: ExpenseId) -> Result<RemovedExpense, AppError> {
        let expense = self
            .repo
            .get_expense(id)
            .await?
            .ok_or_else(|| AppError::ExpenseNotFound(id.to_string()))?;
        let payer_name = self.repo.get_person(expense.payer).await?.map(|p| p.name);
        self.repo.delete_expense(id).await?;
        Ok(RemovedExpense {
            expense,
            payer_name,
        })
    }

    /// Spending overview: total, per-person paid totals, biggest payer.
    pub async fn expense_summary(&self) -> Result<ExpenseSummary, AppError> {
        let expenses = self.repo.list_expenses().await?;
        let people = self.repo.list_people().await?;

        let total_spent = round_to_cents(expenses.iter().map(|e| e.amount).sum());

        let mut paid_by_id: HashMap<PersonId, Amount> = HashMap::new();
        for expense in &expenses {
            *paid_by_id.entry(expense.payer).or_insert(0.0) += expense.amount;
        }

        let mut paid_totals: Vec<PayerTotal> = people
            .iter()
            .map(|person| PayerTotal {
                person: person.clone(),
                paid: round_to_cents(paid_by_id.get(&person.id).copied().unwrap_or(0.0)),
            })
            .collect();
        paid_totals.sort_by(|a, b| b.paid.total_cmp(&a.paid));

        let top_payer = paid_totals.first().filter(|t| t.paid > 0.0).cloned();

        Ok(ExpenseSummary {
            expense_count: expenses.len(),
            total_spent,
            top_payer,
            paid_totals,
        })
    }

    // ========================
    // Packing list operations
    // ========================

    /// Add an item to the packing list.
    pub async fn add_item(&self, name: String, needed: i64) -> Result<Item, AppError> {
        if needed < 1 {
            return Err(AppError::InvalidQuantity(
                "An item must be needed at least once".to_string(),
            ));
        }
        if self.repo.get_item_by_name(&name).await?.is_some() {
            return Err(AppError::ItemAlreadyExists(name));
        }

        let item = Item::new(name, needed);
        self.repo.save_item(&item).await?;
        Ok(item)
    }

    /// Get an item by name.
    pub async fn get_item(&self, name: &str) -> Result<Item, AppError> {
        self.repo
            .get_item_by_name(name)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(name.to_string()))
    }

    /// List the whole packing list.
    pub async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        Ok(self.repo.list_items().await?)
    }

    /// Set how many of an item a person will bring. Zero clears their
    /// commitment.
    pub async fn assign_item(
        &self,
        item_name: &str,
        person_name: &str,
        quantity: i64,
    ) -> Result<Item, AppError> {
        let mut item = self.get_item(item_name).await?;
        let person = self.get_person(person_name).await?;

        item.assign(person.id, quantity).map_err(|err| match err {
            AssignmentError::NegativeQuantity { .. } => {
                AppError::InvalidQuantity("Quantity cannot be negative".to_string())
            }
            AssignmentError::ExceedsNeeded {
                needed,
                already_assigned,
                requested,
            } => AppError::AssignmentExceedsNeeded {
                item_name: item.name.clone(),
                needed,
                already_assigned,
                requested,
            },
        })?;

        self.repo.update_item(&item).await?;
        Ok(item)
    }

    /// Mark an item packed or unpacked.
    pub async fn set_packed(&self, item_name: &str, packed: bool) -> Result<Item, AppError> {
        let mut item = self.get_item(item_name).await?;
        item.packed = packed;
        self.repo.update_item(&item).await?;
        Ok(item)
    }

    /// Remove an item from the packing list.
    pub async fn remove_item(&self, name: &str) -> Result<Item, AppError> {
        let item = self.get_item(name).await?;
        self.repo.delete_item(item.id).await?;
        Ok(item)
    }

    /// Packing progress: covered items and per-person carried load.
    pub async fn packing_report(&self) -> Result<PackingReport, AppError> {
        let items = self.repo.list_items().await?;
        let people = self.repo.list_people().await?;

        let total_items = items.len();
        let covered_items = items.iter().filter(|i| i.is_covered()).count();
        let progress_percent = if total_items == 0 {
            0
        } else {
            (covered_items as f64 / total_items as f64 * 100.0).round() as u8
        };

        let mut loads: Vec<PersonLoad> = people
            .iter()
            .map(|person| {
                let quantity = items
                    .iter()
                    .map(|item| item.assigned.get(&person.id).copied().unwrap_or(0))
                    .sum();
                PersonLoad {
                    person: person.clone(),
                    quantity,
                }
            })
            .collect();
        loads.sort_by(|a, b| b.quantity.cmp(&a.quantity));

        Ok(PackingReport {
            total_items,
            covered_items,
            progress_percent,
            loads,
        })
    }

    // ========================
    // Settlement operations
    // ========================

    /// Net balance for everyone on the trip, in people-list order.
    pub async fn balances(&self) -> Result<Vec<BalanceEntry>, AppError> {
        let people = self.repo.list_people().await?;
        let expenses = self.repo.list_expenses().await?;
        let balances = compute_balances(&expenses, &people);

        Ok(people
            .into_iter()
            .map(|person| {
                let balance = balances.get(&person.id).copied().unwrap_or(0.0);
                BalanceEntry { person, balance }
            })
            .collect())
    }

    /// Net balance for a single person.
    pub async fn person_balance(&self, name: &str) -> Result<BalanceEntry, AppError> {
        let person = self.get_person(name).await?;
        let expenses = self.repo.list_expenses().await?;
        let all_ids: Vec<PersonId> = self
            .repo
            .list_people()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let balance = crate::domain::person_balance(person.id, &expenses, &all_ids);
        Ok(BalanceEntry { person, balance })
    }

    /// Who owes whom: balances plus the minimized transfer list. Recomputed
    /// from scratch on every call; nothing is cached or persisted.
    pub async fn settlement_plan(&self) -> Result<SettlementPlan, AppError> {
        let people = self.repo.list_people().await?;
        let expenses = self.repo.list_expenses().await?;

        let balances = compute_balances(&expenses, &people);
        let settlements = calculate_settlements(&expenses, &people);

        let entries = people
            .into_iter()
            .map(|person| {
                let balance = balances.get(&person.id).copied().unwrap_or(0.0);
                BalanceEntry { person, balance }
            })
            .collect();

        Ok(SettlementPlan {
            balances: entries,
            settlements,
        })
    }
}
