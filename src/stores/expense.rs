//! Defines the expense store trait.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    Error,
    models::{Category, DatabaseID, Expense, NewExpense, UserID},
};

/// Handles the creation and retrieval of expenses.
pub trait ExpenseStore {
    /// Create a new expense in the store.
    fn create(&mut self, new_expense: NewExpense) -> Result<Expense, Error>;

    /// Retrieve an expense by its ID alone, regardless of owner.
    ///
    /// Callers must compare ownership themselves; this is the load half of
    /// the load-then-compare pattern used by update and delete.
    fn get(&self, id: DatabaseID) -> Result<Expense, Error>;

    /// Retrieve an expense by its ID and owner.
    ///
    /// Returns [Error::NotFound] whether the expense is absent or owned by a
    /// different user, so callers cannot probe for other users' records.
    fn get_owned(&self, id: DatabaseID, user_id: UserID) -> Result<Expense, Error>;

    /// Retrieve expenses from the store in the way defined by `query`.
    fn get_query(&self, query: ExpenseQuery) -> Result<Vec<Expense>, Error>;

    /// Overwrite the stored expense with the same ID as `expense`.
    fn update(&mut self, expense: &Expense) -> Result<(), Error>;

    /// Remove an expense from the store.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;
}

/// Defines how expenses should be fetched from [ExpenseStore::get_query].
///
/// All queries are scoped to one owning user; category and date range narrow
/// the result further.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    /// Only include expenses owned by this user.
    pub user_id: UserID,
    /// Only include expenses with this category.
    pub category: Option<Category>,
    /// Only include expenses within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
}

impl ExpenseQuery {
    /// A query for all of a user's expenses.
    pub fn for_user(user_id: UserID) -> Self {
        Self {
            user_id,
            category: None,
            date_range: None,
        }
    }
}
