use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::TripService;
use crate::domain::{Expense, Item, Person, format_amount};

/// Database snapshot for full export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub people: Vec<Person>,
    pub expenses: Vec<Expense>,
    pub items: Vec<Item>,
}

/// Exporter for converting trip data to various formats
pub struct Exporter<'a> {
    service: &'a TripService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a TripService) -> Self {
        Self { service }
    }

    /// Export expenses to CSV format
    pub async fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let expenses = self.service.list_expenses().await?;
        let names = self.service.person_names().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "description",
            "amount",
            "paid_by",
            "shared_with",
        ])?;

        let mut count = 0;
        for expense in &expenses {
            let paid_by = names
                .get(&expense.payer)
                .cloned()
                .unwrap_or_else(|| expense.payer.to_string());
            // Empty shared_with means "everyone"; unknown ids fall back to
            // the raw id so the row stays re-importable by hand.
            let shared_with = expense
                .shared_by
                .iter()
                .map(|id| names.get(id).cloned().unwrap_or_else(|| id.to_string()))
                .collect::<Vec<_>>()
                .join(";");

            csv_writer.write_record([
                expense.id.to_string(),
                expense.spent_at.to_rfc3339(),
                expense.description.clone(),
                format_amount(expense.amount),
                paid_by,
                shared_with,
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export balances to CSV format
    pub async fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let balances = self.service.balances().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["person", "balance"])?;

        let mut count = 0;
        for entry in &balances {
            csv_writer.write_record([&entry.person.name, &format_amount(entry.balance)])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the settlement plan to CSV format
    pub async fn export_settlements_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let plan = self.service.settlement_plan().await?;
        let names = self.service.person_names().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["from", "to", "amount"])?;

        let mut count = 0;
        for settlement in &plan.settlements {
            let from = names
                .get(&settlement.from)
                .cloned()
                .unwrap_or_else(|| settlement.from.to_string());
            let to = names
                .get(&settlement.to)
                .cloned()
                .unwrap_or_else(|| settlement.to.to_string());
            csv_writer.write_record([from, to, format_amount(settlement.amount)])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the packing list to CSV format
    pub async fn export_items_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let items = self.service.list_items().await?;
        let names = self.service.person_names().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["name", "needed", "assigned", "packed", "covered"])?;

        let mut count = 0;
        for item in &items {
            let mut assignments: Vec<String> = item
                .assigned
                .iter()
                .map(|(id, qty)| {
                    let name = names.get(id).cloned().unwrap_or_else(|| id.to_string());
                    format!("{}={}", name, qty)
                })
                .collect();
            assignments.sort();

            csv_writer.write_record([
                item.name.clone(),
                item.needed.to_string(),
                assignments.join(";"),
                item.packed.to_string(),
                item.is_covered().to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full trip to JSON
    pub async fn export_full_json<W: Write>(&self, writer: W) -> Result<TripSnapshot> {
        let snapshot = TripSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            people: self.service.list_people().await?,
            expenses: self.service.list_expenses().await?,
            items: self.service.list_items().await?,
        };

        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(snapshot)
    }
}
