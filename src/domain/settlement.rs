use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Amount, Expense, Person, PersonId, round_to_cents};

/// A suggested transfer that reduces outstanding balances. Derived on demand
/// from the current expenses and people; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: PersonId,
    pub to: PersonId,
    /// Always strictly positive, rounded to 2 decimals.
    pub amount: Amount,
}

/// Balances within this band of zero count as settled. The band is what
/// keeps float drift from non-divisible splits from generating endless
/// cent-sized transfers.
const SETTLED_TOLERANCE: Amount = 0.01;

/// Reduce all expenses to a net balance per known person.
/// Positive means the person is owed money, negative means they owe.
///
/// An expense's cost is split among its `shared_by` set, or among everyone
/// currently on the trip when that set is empty. Ids that don't match a
/// known person are skipped: the payer's credit is dropped if the payer is
/// unknown, and unknown beneficiaries simply don't absorb their share. An
/// expense whose split set works out empty is ignored entirely.
pub fn compute_balances(expenses: &[Expense], people: &[Person]) -> HashMap<PersonId, Amount> {
    let mut balances: HashMap<PersonId, Amount> =
        people.iter().map(|person| (person.id, 0.0)).collect();
    let all_ids: Vec<PersonId> = people.iter().map(|person| person.id).collect();

    for expense in expenses {
        let split: &[PersonId] = if expense.shared_by.is_empty() {
            &all_ids
        } else {
            &expense.shared_by
        };
        if split.is_empty() {
            // No people on the trip and no named participants; skipping
            // avoids a division by zero and matches "nobody owes anybody".
            continue;
        }

        let share = expense.amount / split.len() as Amount;

        if let Some(balance) = balances.get_mut(&expense.payer) {
            *balance += expense.amount;
        }

        for id in split {
            if let Some(balance) = balances.get_mut(id) {
                *balance -= share;
            }
        }
    }

    balances
}

/// Net balance for a single person, without building the full balance map.
/// Produces the same number as `compute_balances(...)[&person_id]` for any
/// known person.
pub fn person_balance(
    person_id: PersonId,
    expenses: &[Expense],
    all_person_ids: &[PersonId],
) -> Amount {
    let mut balance = 0.0;
    for expense in expenses {
        if expense.payer == person_id {
            balance += expense.amount;
        }
        let split: &[PersonId] = if expense.shared_by.is_empty() {
            all_person_ids
        } else {
            &expense.shared_by
        };
        if split.is_empty() {
            continue;
        }
        if split.contains(&person_id) {
            balance -= expense.amount / split.len() as Amount;
        }
    }
    balance
}

/// Turn a balance map into a short list of transfers that zero everyone out.
///
/// Greedy largest-to-largest matching: debtors and creditors are each sorted
/// by magnitude and walked with two cursors, transferring
/// min(|debt|, credit) at every step. Not provably transfer-count optimal,
/// but deterministic and close enough in practice.
pub fn settle_balances(balances: &HashMap<PersonId, Amount>) -> Vec<Settlement> {
    let mut debtors: Vec<(PersonId, Amount)> = Vec::new();
    let mut creditors: Vec<(PersonId, Amount)> = Vec::new();

    for (&id, &raw) in balances {
        // Round before classifying so float noise can't promote a settled
        // person into a debtor or creditor.
        let value = round_to_cents(raw);
        if value < -SETTLED_TOLERANCE {
            debtors.push((id, value));
        } else if value > SETTLED_TOLERANCE {
            creditors.push((id, value));
        }
    }

    // Most negative debtor and largest creditor first. Person id as
    // tie-break keeps output independent of map iteration order.
    debtors.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    creditors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut settlements = Vec::new();
    let mut i = 0; // debtor cursor
    let mut j = 0; // creditor cursor

    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].1.abs().min(creditors[j].1);

        if amount > 0.0 {
            settlements.push(Settlement {
                from: debtors[i].0,
                to: creditors[j].0,
                amount: round_to_cents(amount),
            });
        }

        // Remainders stay unrounded; only the emitted amount is rounded.
        debtors[i].1 += amount;
        creditors[j].1 -= amount;

        if debtors[i].1.abs() < SETTLED_TOLERANCE {
            i += 1;
        }
        if creditors[j].1 < SETTLED_TOLERANCE {
            j += 1;
        }
    }

    // Residue smaller than the tolerance on whichever side outlasted the
    // other is dropped silently.
    settlements
}

/// Full pipeline: expenses and people in, minimized transfer list out.
pub fn calculate_settlements(expenses: &[Expense], people: &[Person]) -> Vec<Settlement> {
    settle_balances(&compute_balances(expenses, people))
}
