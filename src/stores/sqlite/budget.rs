//! Implements a SQLite backed budget store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Budget, DatabaseID, NewBudget, UserID},
    stores::BudgetStore,
};

/// Stores budgets in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteBudgetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const BUDGET_COLUMNS: &str = "id, user_id, category, amount, period, start_date, end_date";

impl BudgetStore for SQLiteBudgetStore {
    /// Create a new budget in the database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    fn create(&mut self, new_budget: NewBudget) -> Result<Budget, Error> {
        let budget = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO budget (user_id, category, amount, period, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {BUDGET_COLUMNS}",
            ))?
            .query_row(
                (
                    new_budget.user_id,
                    new_budget.category,
                    new_budget.amount,
                    new_budget.period,
                    new_budget.start_date,
                    new_budget.end_date,
                ),
                Self::map_row,
            )?;

        Ok(budget)
    }

    /// Retrieve a budget in the database by its `id`, regardless of owner.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid budget,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Budget, Error> {
        let budget = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(budget)
    }

    /// Retrieve a budget by its `id` and owner.
    ///
    /// The ownership check is folded into the query so "not found" and "not
    /// yours" are indistinguishable to the caller.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if there is no budget with `id` owned by `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_owned(&self, id: DatabaseID, user_id: UserID) -> Result<Budget, Error> {
        let budget = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                &[(":id", &id), (":user_id", &user_id.as_i64())],
                Self::map_row,
            )?;

        Ok(budget)
    }

    /// Retrieve all budgets owned by `user_id`.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is a SQL error.
    fn get_for_user(&self, user_id: UserID) -> Result<Vec<Budget>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budget WHERE user_id = :user_id ORDER BY id ASC"
            ))?
            .query_map(&[(":user_id", &user_id)], Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(Error::SqlError))
            .collect()
    }

    /// Overwrite the stored budget with the same ID as `budget`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the budget is not in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, budget: &Budget) -> Result<(), Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE budget
             SET category = ?1, amount = ?2, period = ?3, start_date = ?4, end_date = ?5
             WHERE id = ?6",
            (
                budget.category,
                budget.amount,
                budget.period,
                budget.start_date,
                budget.end_date,
                budget.id,
            ),
        )?;

        if rows_updated == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    /// Remove a budget from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the budget is not in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM budget WHERE id = ?1", (id,))?;

        if rows_deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

impl CreateTable for SQLiteBudgetStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE budget (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    category TEXT NOT NULL,
                    amount REAL NOT NULL,
                    period TEXT NOT NULL,
                    start_date TEXT NOT NULL,
                    end_date TEXT,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteBudgetStore {
    type ReturnType = Budget;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = row.get(offset + 1)?;
        let category = row.get(offset + 2)?;
        let amount = row.get(offset + 3)?;
        let period = row.get(offset + 4)?;
        let start_date = row.get(offset + 5)?;
        let end_date = row.get(offset + 6)?;

        Ok(Budget {
            id,
            user_id,
            category,
            amount,
            period,
            start_date,
            end_date,
        })
    }
}

#[cfg(test)]
mod sqlite_budget_store_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        models::{Category, NewBudget, NewUser, PasswordHash, Period, UserID},
        stores::{
            BudgetStore, UserStore,
            sqlite::{SQLiteBudgetStore, SQLiteUserStore},
        },
    };

    fn get_test_store() -> (SQLiteBudgetStore, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        let user = SQLiteUserStore::new(connection.clone())
            .create(
                NewUser::new(
                    "Jo",
                    EmailAddress::from_str("foo@bar.baz").unwrap(),
                    PasswordHash::new_unchecked("hunter2"),
                )
                .unwrap(),
            )
            .unwrap();

        (SQLiteBudgetStore::new(connection), user.id)
    }

    #[test]
    fn create_then_get_returns_the_budget() {
        let (mut store, user_id) = get_test_store();

        let inserted = store
            .create(
                NewBudget::new(
                    user_id,
                    Category::Food,
                    100.0,
                    Period::Monthly,
                    date!(2024 - 01 - 01),
                )
                .unwrap(),
            )
            .unwrap();
        let selected = store.get(inserted.id).unwrap();

        assert_eq!(inserted, selected);
        assert_eq!(selected.end_date, Some(date!(2024 - 02 - 01)));
    }

    #[test]
    fn get_owned_fails_for_other_user() {
        let (mut store, user_id) = get_test_store();

        let inserted = store
            .create(
                NewBudget::new(
                    user_id,
                    Category::Food,
                    100.0,
                    Period::Monthly,
                    date!(2024 - 01 - 01),
                )
                .unwrap(),
            )
            .unwrap();
        let result = store.get_owned(inserted.id, UserID::new(user_id.as_i64() + 1));

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_for_user_only_returns_own_budgets() {
        let (mut store, user_id) = get_test_store();

        let inserted = store
            .create(
                NewBudget::new(
                    user_id,
                    Category::Food,
                    100.0,
                    Period::Monthly,
                    date!(2024 - 01 - 01),
                )
                .unwrap(),
            )
            .unwrap();

        assert_eq!(store.get_for_user(user_id).unwrap(), vec![inserted]);
        assert_eq!(
            store
                .get_for_user(UserID::new(user_id.as_i64() + 1))
                .unwrap(),
            vec![]
        );
    }

    #[test]
    fn update_overwrites_fields() {
        let (mut store, user_id) = get_test_store();

        let mut budget = store
            .create(
                NewBudget::new(
                    user_id,
                    Category::Food,
                    100.0,
                    Period::Monthly,
                    date!(2024 - 01 - 01),
                )
                .unwrap(),
            )
            .unwrap();
        budget.amount = 250.0;
        budget.period = Period::Weekly;
        budget.end_date = Some(budget.period.end_date_from(budget.start_date));

        store.update(&budget).unwrap();

        assert_eq!(store.get(budget.id).unwrap(), budget);
    }

    #[test]
    fn delete_removes_the_budget() {
        let (mut store, user_id) = get_test_store();

        let budget = store
            .create(
                NewBudget::new(
                    user_id,
                    Category::Food,
                    100.0,
                    Period::Monthly,
                    date!(2024 - 01 - 01),
                )
                .unwrap(),
            )
            .unwrap();

        store.delete(budget.id).unwrap();

        assert_eq!(store.get(budget.id), Err(Error::NotFound));
    }
}
