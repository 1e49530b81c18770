//! Defines the budget store trait.

use crate::{
    Error,
    models::{Budget, DatabaseID, NewBudget, UserID},
};

/// Handles the creation and retrieval of budgets.
///
/// Stores hold only the budget's own fields; the spent/remaining projection
/// is computed by the budget service at read time and never persisted.
pub trait BudgetStore {
    /// Create a new budget in the store.
    fn create(&mut self, new_budget: NewBudget) -> Result<Budget, Error>;

    /// Retrieve a budget by its ID alone, regardless of owner.
    fn get(&self, id: DatabaseID) -> Result<Budget, Error>;

    /// Retrieve a budget by its ID and owner.
    ///
    /// Returns [Error::NotFound] whether the budget is absent or owned by a
    /// different user.
    fn get_owned(&self, id: DatabaseID, user_id: UserID) -> Result<Budget, Error>;

    /// Retrieve all budgets owned by `user_id`.
    fn get_for_user(&self, user_id: UserID) -> Result<Vec<Budget>, Error>;

    /// Overwrite the stored budget with the same ID as `budget`.
    fn update(&mut self, budget: &Budget) -> Result<(), Error>;

    /// Remove a budget from the store.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;
}
