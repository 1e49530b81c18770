//! This file defines the fixed set of expense categories shared by expenses
//! and budgets.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The category of an expense or budget.
///
/// Expenses and budgets share this set, which is what relates a budget to the
/// expenses it caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Groceries and eating out.
    Food,
    /// Public transport, fuel, vehicle costs.
    Transportation,
    /// Rent, mortgage, rates.
    Housing,
    /// Movies, games, going out.
    Entertainment,
    /// Power, water, internet.
    Utilities,
    /// Doctor and pharmacy costs.
    Healthcare,
    /// Courses, books, school fees.
    Education,
    /// Clothing and general retail.
    Shopping,
    /// Anything that does not fit the other categories.
    Other,
}

impl Category {
    /// All categories, in a stable order.
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Transportation,
        Category::Housing,
        Category::Entertainment,
        Category::Utilities,
        Category::Healthcare,
        Category::Education,
        Category::Shopping,
        Category::Other,
    ];

    /// The category's name as stored in the database and shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Housing => "Housing",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(std::io::Error::other(format!(
                "invalid category in database: {error}"
            )))))
    }
}
