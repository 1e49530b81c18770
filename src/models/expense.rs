//! This file defines the `Expense` type and the types needed to create one.
//! An expense records a single purchase against a category, optionally marked
//! as recurring.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    models::{Category, DatabaseID, UserID},
};

/// How often a recurring expense repeats.
///
/// Only meaningful when the expense is marked as recurring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringInterval {
    /// Repeats every day.
    Daily,
    /// Repeats every week.
    Weekly,
    /// Repeats every month.
    Monthly,
    /// Repeats every year.
    Yearly,
}

impl RecurringInterval {
    /// The interval's name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringInterval::Daily => "daily",
            RecurringInterval::Weekly => "weekly",
            RecurringInterval::Monthly => "monthly",
            RecurringInterval::Yearly => "yearly",
        }
    }
}

impl FromStr for RecurringInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(RecurringInterval::Daily),
            "weekly" => Ok(RecurringInterval::Weekly),
            "monthly" => Ok(RecurringInterval::Monthly),
            "yearly" => Ok(RecurringInterval::Yearly),
            _ => Err(Error::InvalidRecurringInterval(s.to_string())),
        }
    }
}

impl Display for RecurringInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for RecurringInterval {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for RecurringInterval {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|error: Error| {
            FromSqlError::Other(Box::new(std::io::Error::other(format!(
                "invalid recurring interval in database: {error}"
            ))))
        })
    }
}

/// A single expense record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: DatabaseID,

    /// The ID of the user that owns the expense.
    pub user_id: UserID,

    /// How much was spent. Always greater than zero.
    pub amount: f64,

    /// What the expense was for.
    pub description: String,

    /// The category the expense counts against.
    pub category: Category,

    /// The day the expense occurred.
    pub date: Date,

    /// Whether the expense repeats.
    pub is_recurring: bool,

    /// How often the expense repeats, if it does.
    pub recurring_interval: Option<RecurringInterval>,
}

/// The validated data required to create an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The ID of the user creating the expense.
    pub user_id: UserID,
    /// How much was spent.
    pub amount: f64,
    /// What the expense was for.
    pub description: String,
    /// The category the expense counts against.
    pub category: Category,
    /// The day the expense occurred.
    pub date: Date,
    /// Whether the expense repeats.
    pub is_recurring: bool,
    /// How often the expense repeats, if it does.
    pub recurring_interval: Option<RecurringInterval>,
}

impl NewExpense {
    /// Create the data for a new expense.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NonPositiveAmount] if `amount` is zero or negative,
    /// or an [Error::EmptyField] if `description` is empty or whitespace.
    pub fn new(
        user_id: UserID,
        amount: f64,
        description: &str,
        category: Category,
        date: Date,
        is_recurring: bool,
        recurring_interval: Option<RecurringInterval>,
    ) -> Result<Self, Error> {
        if amount <= 0.0 {
            return Err(Error::NonPositiveAmount("amount"));
        }

        let description = description.trim();

        if description.is_empty() {
            return Err(Error::EmptyField("description"));
        }

        Ok(Self {
            user_id,
            amount,
            description: description.to_string(),
            category,
            date,
            is_recurring,
            recurring_interval,
        })
    }
}
