//! Contains traits and implementations for objects that store the domain [models](crate::models).

mod budget;
mod expense;
mod goal;
mod user;

pub mod sqlite;

pub use budget::BudgetStore;
pub use expense::{ExpenseQuery, ExpenseStore};
pub use goal::GoalStore;
pub use user::UserStore;
