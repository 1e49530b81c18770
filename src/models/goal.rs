//! This file defines the `Goal` type and its clamped progress rule.
//! A goal tracks saving towards a target amount by a target date.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    models::{DatabaseID, UserID},
};

/// A savings goal.
///
/// `current_amount` never exceeds `target_amount`: every mutation is clamped
/// rather than rejected. There is deliberately no lower clamp to zero, which
/// matches the behaviour this service has always had; a negative adjustment
/// can drive the current amount below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: DatabaseID,

    /// The ID of the user that owns the goal.
    pub user_id: UserID,

    /// What the user is saving for.
    pub title: String,

    /// The amount the user wants to save. Always greater than zero.
    pub target_amount: f64,

    /// The amount saved so far. Never greater than `target_amount`.
    pub current_amount: f64,

    /// The day the user wants the goal met by.
    pub target_date: Date,

    /// An optional longer description of the goal.
    pub description: Option<String>,
}

impl Goal {
    /// Apply a progress update to the goal.
    ///
    /// If `amount_to_add` is present it is added to the current amount,
    /// otherwise if `current_amount` is present it replaces the current
    /// amount. If neither is present the goal is unchanged. The result is
    /// clamped so it never exceeds the target amount.
    pub fn apply_progress(&mut self, amount_to_add: Option<f64>, current_amount: Option<f64>) {
        if let Some(amount) = amount_to_add {
            self.current_amount += amount;
        } else if let Some(amount) = current_amount {
            self.current_amount = amount;
        }

        if self.current_amount > self.target_amount {
            self.current_amount = self.target_amount;
        }
    }
}

/// The validated data required to create a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    /// The ID of the user creating the goal.
    pub user_id: UserID,
    /// What the user is saving for.
    pub title: String,
    /// The amount the user wants to save.
    pub target_amount: f64,
    /// The amount already saved, clamped to the target amount.
    pub current_amount: f64,
    /// The day the user wants the goal met by.
    pub target_date: Date,
    /// An optional longer description of the goal.
    pub description: Option<String>,
}

impl NewGoal {
    /// Create the data for a new goal.
    ///
    /// `current_amount` defaults to zero and is clamped to `target_amount`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyField] if `title` is empty or whitespace, an
    /// [Error::NonPositiveAmount] if `target_amount` is zero or negative, or
    /// an [Error::NegativeAmount] if `current_amount` is negative.
    pub fn new(
        user_id: UserID,
        title: &str,
        target_amount: f64,
        current_amount: Option<f64>,
        target_date: Date,
        description: Option<String>,
    ) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            return Err(Error::EmptyField("title"));
        }

        if target_amount <= 0.0 {
            return Err(Error::NonPositiveAmount("target_amount"));
        }

        let current_amount = current_amount.unwrap_or(0.0);

        if current_amount < 0.0 {
            return Err(Error::NegativeAmount("current_amount"));
        }

        Ok(Self {
            user_id,
            title: title.to_string(),
            target_amount,
            current_amount: current_amount.min(target_amount),
            target_date,
            description,
        })
    }
}
