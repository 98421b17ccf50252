use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::io::Read;

use crate::application::{AppError, TripService};
use crate::domain::parse_amount;

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
    pub skip_duplicates: bool,
    pub create_missing_people: bool,
}

/// Importer for loading trip data from files
pub struct Importer<'a> {
    service: &'a TripService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a TripService) -> Self {
        Self { service }
    }

    /// Look up a person, treating only "not found" as absence. Anything else
    /// (a broken database, say) aborts the whole import instead of being
    /// mistaken for a missing row.
    async fn person_exists(&self, name: &str) -> Result<bool> {
        match self.service.get_person(name).await {
            Ok(_) => Ok(true),
            Err(AppError::PersonNotFound(_)) => Ok(false),
            Err(AppError::Database(inner)) => Err(inner),
            Err(other) => Err(other.into()),
        }
    }

    /// Import people from CSV. Expected header: `name`
    pub async fn import_people_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let name = record.get(0).unwrap_or("").trim();
            if name.is_empty() {
                errors.push(ImportError {
                    line,
                    field: Some("name".to_string()),
                    error: "Name is required".to_string(),
                });
                continue;
            }

            if self.person_exists(name).await? {
                if options.skip_duplicates {
                    skipped += 1;
                    continue;
                }
                errors.push(ImportError {
                    line,
                    field: Some("name".to_string()),
                    error: format!("Person already exists: {}", name),
                });
                continue;
            }

            if !options.dry_run {
                if let Err(e) = self.service.add_person(name.to_string()).await {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: e.to_string(),
                    });
                    continue;
                }
            }
            imported += 1;
        }

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }

    /// Import expenses from CSV.
    /// Expected header: `date,description,amount,paid_by,shared_with`
    /// where `shared_with` is a `;`-separated list of names, empty meaning
    /// "shared by everyone".
    pub async fn import_expenses_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();

        // For duplicate detection: (date, description, amount, payer name) of
        // every expense already on file, extended as rows go in so a file
        // repeating itself is also caught.
        let mut seen: Vec<(NaiveDate, String, f64, String)> = Vec::new();
        if options.skip_duplicates {
            let names = self.service.person_names().await?;
            for expense in self.service.list_expenses().await? {
                if let Some(payer) = names.get(&expense.payer) {
                    seen.push((
                        expense.spent_at.date_naive(),
                        expense.description.clone(),
                        expense.amount,
                        payer.clone(),
                    ));
                }
            }
        }

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2;

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let date_str = record.get(0).unwrap_or("").trim();
            let description = record.get(1).unwrap_or("").trim();
            let amount_str = record.get(2).unwrap_or("").trim();
            let paid_by = record.get(3).unwrap_or("").trim();
            let shared_with_str = record.get(4).unwrap_or("").trim();

            let spent_at = match parse_flexible_date(date_str) {
                Some(dt) => dt,
                None => {
                    errors.push(ImportError {
                        line,
                        field: Some("date".to_string()),
                        error: format!("Invalid date: {}", date_str),
                    });
                    continue;
                }
            };

            let amount = match parse_amount(amount_str) {
                Ok(a) => a,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("amount".to_string()),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if description.is_empty() || paid_by.is_empty() {
                errors.push(ImportError {
                    line,
                    field: None,
                    error: "Description and paid_by are required".to_string(),
                });
                continue;
            }

            if options.skip_duplicates {
                let is_duplicate = seen.iter().any(|(date, desc, amt, payer)| {
                    *date == spent_at.date_naive()
                        && desc == description
                        && (amt - amount).abs() < 0.005
                        && payer == paid_by
                });
                if is_duplicate {
                    skipped += 1;
                    continue;
                }
            }

            let participants: Vec<String> = shared_with_str
                .split(';')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            // Make sure every referenced person exists (or will).
            let payer_name = paid_by.to_string();
            let mut names_ok = true;
            for name in std::iter::once(&payer_name).chain(participants.iter()) {
                if self.person_exists(name).await? {
                    continue;
                }
                if options.create_missing_people {
                    if !options.dry_run {
                        if let Err(e) = self.service.add_person(name.clone()).await {
                            errors.push(ImportError {
                                line,
                                field: Some("paid_by".to_string()),
                                error: e.to_string(),
                            });
                            names_ok = false;
                            break;
                        }
                    }
                } else {
                    errors.push(ImportError {
                        line,
                        field: Some("paid_by".to_string()),
                        error: format!("Person not found: {}", name),
                    });
                    names_ok = false;
                    break;
                }
            }
            if !names_ok {
                continue;
            }

            if !options.dry_run {
                let result = self
                    .service
                    .add_expense(
                        description.to_string(),
                        amount,
                        paid_by,
                        &participants,
                        spent_at,
                    )
                    .await;
                if let Err(e) = result {
                    // Validation that only triggers on the real write path.
                    match e {
                        AppError::Database(inner) => return Err(inner),
                        other => {
                            errors.push(ImportError {
                                line,
                                field: None,
                                error: other.to_string(),
                            });
                            continue;
                        }
                    }
                }
            }
            if options.skip_duplicates {
                seen.push((
                    spent_at.date_naive(),
                    description.to_string(),
                    amount,
                    paid_by.to_string(),
                ));
            }
            imported += 1;
        }

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }
}

/// Accepts `YYYY-MM-DD` or full RFC 3339 timestamps.
fn parse_flexible_date(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}
