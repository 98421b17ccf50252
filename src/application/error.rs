use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Person already exists: {0}")]
    PersonAlreadyExists(String),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Item already exists: {0}")]
    ItemAlreadyExists(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error(
        "Cannot assign {requested} of '{item_name}': only {needed} needed, {already_assigned} already assigned to others"
    )]
    AssignmentExceedsNeeded {
        item_name: String,
        needed: i64,
        already_assigned: i64,
        requested: i64,
    },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
