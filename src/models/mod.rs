//! The domain models: users, expenses, budgets, and savings goals.

mod budget;
mod category;
mod expense;
mod goal;
mod password;
mod user;

pub use budget::{Budget, NewBudget, Period};
pub use category::Category;
pub use expense::{Expense, NewExpense, RecurringInterval};
pub use goal::{Goal, NewGoal};
pub use password::PasswordHash;
pub use user::{NewUser, User, UserID};

/// An alias for the integer IDs used by the database.
pub type DatabaseID = i64;
