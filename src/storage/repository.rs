use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Expense, ExpenseId, Item, ItemId, Person, PersonId};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying people, expenses and packing items.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // People operations
    // ========================

    /// Save a new person to the database.
    pub async fn save_person(&self, person: &Person) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO people (id, name, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(person.id.to_string())
        .bind(&person.name)
        .bind(person.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save person")?;
        Ok(())
    }

    /// Get a person by ID.
    pub async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        let row = sqlx::query("SELECT id, name, created_at FROM people WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch person")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_person(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a person by name.
    pub async fn get_person_by_name(&self, name: &str) -> Result<Option<Person>> {
        let row = sqlx::query("SELECT id, name, created_at FROM people WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch person by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_person(&row)?)),
            None => Ok(None),
        }
    }

    /// List all people, ordered by name.
    pub async fn list_people(&self) -> Result<Vec<Person>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM people ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list people")?;

        rows.iter().map(Self::row_to_person).collect()
    }

    /// Delete a person. Expenses and item assignments referencing the id
    /// are intentionally left in place; the settlement engine skips ids it
    /// no longer knows.
    pub async fn delete_person(&self, id: PersonId) -> Result<()> {
        sqlx::query("DELETE FROM people WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete person")?;
        Ok(())
    }

    fn row_to_person(row: &sqlx::sqlite::SqliteRow) -> Result<Person> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Person {
            id: Uuid::parse_str(&id_str).context("Invalid person ID")?,
            name: row.get("name"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Expense operations
    // ========================

    /// Save a new expense to the database.
    pub async fn save_expense(&self, expense: &Expense) -> Result<()> {
        let shared_by_json = serde_json::to_string(&expense.shared_by)?;

        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount, payer_id, shared_by, spent_at, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.payer.to_string())
        .bind(&shared_by_json)
        .bind(expense.spent_at.to_rfc3339())
        .bind(expense.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;

        Ok(())
    }

    /// Get an expense by ID.
    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>> {
        let row = sqlx::query(
            r#"
            SELECT id, description, amount, payer_id, shared_by, spent_at, recorded_at
            FROM expenses
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch expense")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_expense(&row)?)),
            None => Ok(None),
        }
    }

    /// List all expenses, oldest spend first.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, amount, payer_id, shared_by, spent_at, recorded_at
            FROM expenses
            ORDER BY spent_at, recorded_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    /// Delete an expense.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<()> {
        sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete expense")?;
        Ok(())
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let id_str: String = row.get("id");
        let payer_str: String = row.get("payer_id");
        let shared_by_json: String = row.get("shared_by");
        let spent_at_str: String = row.get("spent_at");
        let recorded_at_str: String = row.get("recorded_at");

        let shared_by: Vec<PersonId> =
            serde_json::from_str(&shared_by_json).context("Invalid shared_by JSON")?;

        Ok(Expense {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            description: row.get("description"),
            amount: row.get("amount"),
            payer: Uuid::parse_str(&payer_str).context("Invalid payer ID")?,
            shared_by,
            spent_at: DateTime::parse_from_rfc3339(&spent_at_str)
                .context("Invalid spent_at timestamp")?
                .with_timezone(&Utc),
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Item operations
    // ========================

    /// Save a new packing item to the database.
    pub async fn save_item(&self, item: &Item) -> Result<()> {
        let assigned_json = serde_json::to_string(&item.assigned)?;

        sqlx::query(
            r#"
            INSERT INTO items (id, name, needed, assigned, packed, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(&item.name)
        .bind(item.needed)
        .bind(&assigned_json)
        .bind(item.packed)
        .bind(item.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save item")?;

        Ok(())
    }

    /// Update an existing item's assignments and packed flag.
    pub async fn update_item(&self, item: &Item) -> Result<()> {
        let assigned_json = serde_json::to_string(&item.assigned)?;

        sqlx::query("UPDATE items SET needed = ?, assigned = ?, packed = ? WHERE id = ?")
            .bind(item.needed)
            .bind(&assigned_json)
            .bind(item.packed)
            .bind(item.id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update item")?;

        Ok(())
    }

    /// Get an item by name.
    pub async fn get_item_by_name(&self, name: &str) -> Result<Option<Item>> {
        let row = sqlx::query(
            "SELECT id, name, needed, assigned, packed, created_at FROM items WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch item by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_item(&row)?)),
            None => Ok(None),
        }
    }

    /// List all packing items, ordered by name.
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            "SELECT id, name, needed, assigned, packed, created_at FROM items ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list items")?;

        rows.iter().map(Self::row_to_item).collect()
    }

    /// Delete an item.
    pub async fn delete_item(&self, id: ItemId) -> Result<()> {
        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete item")?;
        Ok(())
    }

    fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<Item> {
        let id_str: String = row.get("id");
        let assigned_json: String = row.get("assigned");
        let created_at_str: String = row.get("created_at");

        let assigned: HashMap<PersonId, i64> =
            serde_json::from_str(&assigned_json).context("Invalid assigned JSON")?;

        Ok(Item {
            id: Uuid::parse_str(&id_str).context("Invalid item ID")?,
            name: row.get("name"),
            needed: row.get("needed"),
            assigned,
            packed: row.get::<i32, _>("packed") != 0,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
