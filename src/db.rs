/*! This module defines traits for mapping the domain models to and from the
application's database, and a function for setting up the schema. */

use rusqlite::{Connection, Row, Transaction as SqlTransaction};

use crate::{
    Error,
    stores::sqlite::{
        SQLiteBudgetStore, SQLiteExpenseStore, SQLiteGoalStore, SQLiteUserStore,
    },
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type that the row is mapped to.
    type ReturnType;

    /// Map `row` to the return type, reading columns from the start of the row.
    ///
    /// # Errors
    /// Returns an error if a column is missing or contains an invalid value.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Map `row` to the return type, reading columns starting at `offset`.
    ///
    /// # Errors
    /// Returns an error if a column is missing or contains an invalid value.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Create the tables for all domain models.
///
/// # Errors
/// Returns an error if the tables could not be created, e.g. they already
/// exist or the database is not writable.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    SQLiteUserStore::create_table(&transaction)?;
    SQLiteExpenseStore::create_table(&transaction)?;
    SQLiteBudgetStore::create_table(&transaction)?;
    SQLiteGoalStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
