//! This file defines the `Budget` type, its recurrence period, and the
//! end-date derivation rule.
//! A budget caps spending for one category over one time window.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, util::days_in_year_month};

use crate::{
    Error,
    models::{Category, DatabaseID, UserID},
};

/// The recurrence unit used to derive a budget's active window end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The budget covers one week.
    Weekly,
    /// The budget covers one calendar month.
    #[default]
    Monthly,
    /// The budget covers one calendar year.
    Yearly,
}

impl Period {
    /// The period's name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    /// Derive the end date of a budget window starting at `start_date`.
    ///
    /// - Weekly periods end exactly seven days after the start.
    /// - Monthly periods end on the same day of the next calendar month.
    /// - Yearly periods end on the same month and day of the next year.
    ///
    /// When the target month is shorter than the start day, the day is
    /// clamped to the last day of the target month, so a monthly budget
    /// starting 2024-01-31 ends on 2024-02-29.
    pub fn end_date_from(&self, start_date: Date) -> Date {
        match self {
            Period::Weekly => start_date + Duration::days(7),
            Period::Monthly => {
                let (year, month) = match start_date.month() {
                    Month::December => (start_date.year() + 1, Month::January),
                    month => (start_date.year(), month.next()),
                };

                date_with_clamped_day(year, month, start_date.day())
            }
            Period::Yearly => {
                date_with_clamped_day(start_date.year() + 1, start_date.month(), start_date.day())
            }
        }
    }
}

/// Build a date from parts, clamping `day` to the length of the target month.
fn date_with_clamped_day(year: i32, month: Month, day: u8) -> Date {
    let day = day.min(days_in_year_month(year, month));

    Date::from_calendar_date(year, month, day)
        .expect("day is clamped to the length of the target month")
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            _ => Err(Error::InvalidPeriod(s.to_string())),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Period {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Period {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|error: Error| {
            FromSqlError::Other(Box::new(std::io::Error::other(format!(
                "invalid period in database: {error}"
            ))))
        })
    }
}

/// A spending cap for one category over one time window.
///
/// `end_date` is derived from `period` and `start_date`, never set directly
/// by the client. The spent/remaining projection is computed at read time
/// and is not part of the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: DatabaseID,

    /// The ID of the user that owns the budget.
    pub user_id: UserID,

    /// The category the budget caps.
    pub category: Category,

    /// The spending cap. Always greater than zero.
    pub amount: f64,

    /// The recurrence unit of the budget window.
    pub period: Period,

    /// The first day of the budget window.
    pub start_date: Date,

    /// The derived last day of the budget window. Strictly after
    /// `start_date` when present.
    pub end_date: Option<Date>,
}

/// The validated data required to create a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The ID of the user creating the budget.
    pub user_id: UserID,
    /// The category the budget caps.
    pub category: Category,
    /// The spending cap.
    pub amount: f64,
    /// The recurrence unit of the budget window.
    pub period: Period,
    /// The first day of the budget window.
    pub start_date: Date,
    /// The derived last day of the budget window.
    pub end_date: Date,
}

impl NewBudget {
    /// Create the data for a new budget, deriving its end date.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NonPositiveAmount] if `amount` is zero or negative.
    pub fn new(
        user_id: UserID,
        category: Category,
        amount: f64,
        period: Period,
        start_date: Date,
    ) -> Result<Self, Error> {
        if amount <= 0.0 {
            return Err(Error::NonPositiveAmount("amount"));
        }

        Ok(Self {
            user_id,
            category,
            amount,
            period,
            start_date,
            end_date: period.end_date_from(start_date),
        })
    }
}

#[cfg(test)]
mod period_tests {
    use time::macros::date;

    use crate::models::Period;

    #[test]
    fn weekly_end_date_is_exactly_seven_days_later() {
        let end_date = Period::Weekly.end_date_from(date!(2024 - 01 - 31));

        assert_eq!(end_date, date!(2024 - 02 - 07));
    }

    #[test]
    fn monthly_end_date_is_same_day_next_month() {
        let end_date = Period::Monthly.end_date_from(date!(2024 - 03 - 15));

        assert_eq!(end_date, date!(2024 - 04 - 15));
    }

    #[test]
    fn monthly_end_date_clamps_to_last_day_of_short_month() {
        // 2024 is a leap year.
        let end_date = Period::Monthly.end_date_from(date!(2024 - 01 - 31));

        assert_eq!(end_date, date!(2024 - 02 - 29));
    }

    #[test]
    fn monthly_end_date_clamps_to_february_28_off_leap_years() {
        let end_date = Period::Monthly.end_date_from(date!(2023 - 01 - 31));

        assert_eq!(end_date, date!(2023 - 02 - 28));
    }

    #[test]
    fn monthly_end_date_rolls_over_december() {
        let end_date = Period::Monthly.end_date_from(date!(2024 - 12 - 10));

        assert_eq!(end_date, date!(2025 - 01 - 10));
    }

    #[test]
    fn yearly_end_date_is_same_day_next_year() {
        let end_date = Period::Yearly.end_date_from(date!(2024 - 05 - 20));

        assert_eq!(end_date, date!(2025 - 05 - 20));
    }

    #[test]
    fn yearly_end_date_clamps_leap_day() {
        let end_date = Period::Yearly.end_date_from(date!(2024 - 02 - 29));

        assert_eq!(end_date, date!(2025 - 02 - 28));
    }

    #[test]
    fn end_date_is_strictly_after_start_date() {
        for period in [Period::Weekly, Period::Monthly, Period::Yearly] {
            let start_date = date!(2024 - 01 - 31);

            assert!(period.end_date_from(start_date) > start_date);
        }
    }
}
