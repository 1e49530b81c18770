//! SQLite backed implementations of the store traits.
//!
//! All stores share a single connection behind an `Arc<Mutex<..>>`, matching
//! the one-writer model SQLite imposes.

mod budget;
mod expense;
mod goal;
mod user;

pub use budget::SQLiteBudgetStore;
pub use expense::SQLiteExpenseStore;
pub use goal::SQLiteGoalStore;
pub use user::SQLiteUserStore;
