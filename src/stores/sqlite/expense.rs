//! Implements a SQLite backed expense store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Expense, NewExpense, UserID},
    stores::{ExpenseQuery, ExpenseStore},
};

/// Stores expenses in a SQLite database.
///
/// Note that because an expense depends on the [User](crate::models::User)
/// model, the user table must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const EXPENSE_COLUMNS: &str =
    "id, user_id, amount, description, category, date, is_recurring, recurring_interval";

impl ExpenseStore for SQLiteExpenseStore {
    /// Create a new expense in the database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    fn create(&mut self, new_expense: NewExpense) -> Result<Expense, Error> {
        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO expense (user_id, amount, description, category, date, is_recurring, recurring_interval)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {EXPENSE_COLUMNS}",
            ))?
            .query_row(
                (
                    new_expense.user_id,
                    new_expense.amount,
                    new_expense.description,
                    new_expense.category,
                    new_expense.date,
                    new_expense.is_recurring,
                    new_expense.recurring_interval,
                ),
                Self::map_row,
            )?;

        Ok(expense)
    }

    /// Retrieve an expense in the database by its `id`, regardless of owner.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid expense,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Expense, Error> {
        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(expense)
    }

    /// Retrieve an expense by its `id` and owner.
    ///
    /// The ownership check is folded into the query so "not found" and "not
    /// yours" are indistinguishable to the caller.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if there is no expense with `id` owned by `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_owned(&self, id: DatabaseID, user_id: UserID) -> Result<Expense, Error> {
        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(&[(":id", &id), (":user_id", &user_id.as_i64())], Self::map_row)?;

        Ok(expense)
    }

    /// Query for expenses in the database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is a SQL error.
    fn get_query(&self, query: ExpenseQuery) -> Result<Vec<Expense>, Error> {
        let mut where_clause_parts = vec!["user_id = ?1".to_string()];
        let mut query_parameters = vec![Value::Integer(query.user_id.as_i64())];

        if let Some(category) = query.category {
            where_clause_parts.push(format!("category = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(category.to_string()));
        }

        if let Some(date_range) = query.date_range {
            where_clause_parts.push(format!(
                "date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(date_range.start().to_string()));
            query_parameters.push(Value::Text(date_range.end().to_string()));
        }

        let query_string = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE {} ORDER BY date ASC, id ASC",
            where_clause_parts.join(" AND ")
        );
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }

    /// Overwrite the stored expense with the same ID as `expense`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the expense is not in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, expense: &Expense) -> Result<(), Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE expense
             SET amount = ?1, description = ?2, category = ?3, date = ?4,
                 is_recurring = ?5, recurring_interval = ?6
             WHERE id = ?7",
            (
                expense.amount,
                &expense.description,
                expense.category,
                expense.date,
                expense.is_recurring,
                expense.recurring_interval,
                expense.id,
            ),
        )?;

        if rows_updated == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    /// Remove an expense from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the expense is not in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM expense WHERE id = ?1", (id,))?;

        if rows_deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE expense (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    amount REAL NOT NULL,
                    description TEXT NOT NULL,
                    category TEXT NOT NULL,
                    date TEXT NOT NULL,
                    is_recurring INTEGER NOT NULL DEFAULT 0,
                    recurring_interval TEXT,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = row.get(offset + 1)?;
        let amount = row.get(offset + 2)?;
        let description = row.get(offset + 3)?;
        let category = row.get(offset + 4)?;
        let date = row.get(offset + 5)?;
        let is_recurring = row.get(offset + 6)?;
        let recurring_interval = row.get(offset + 7)?;

        Ok(Expense {
            id,
            user_id,
            amount,
            description,
            category,
            date,
            is_recurring,
            recurring_interval,
        })
    }
}

#[cfg(test)]
mod sqlite_expense_store_tests {
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
        models::{Category, Expense, NewExpense, NewUser, PasswordHash, RecurringInterval, UserID},
        stores::{
            ExpenseQuery, ExpenseStore, UserStore,
            sqlite::{SQLiteExpenseStore, SQLiteUserStore},
        },
    };

    fn get_test_store() -> (SQLiteExpenseStore, UserID) {
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

        (SQLiteExpenseStore::new(connection), user.id)
    }

    fn insert_expense(
        store: &mut SQLiteExpenseStore,
        user_id: UserID,
        amount: f64,
        category: Category,
        date: time::Date,
    ) -> Expense {
        store
            .create(
                NewExpense::new(user_id, amount, "an expense", category, date, false, None)
                    .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn create_then_get_returns_the_expense() {
        let (mut store, user_id) = get_test_store();

        let inserted = store
            .create(
                NewExpense::new(
                    user_id,
                    12.5,
                    "lunch",
                    Category::Food,
                    date!(2024 - 01 - 15),
                    true,
                    Some(RecurringInterval::Weekly),
                )
                .unwrap(),
            )
            .unwrap();
        let selected = store.get(inserted.id).unwrap();

        assert_eq!(inserted, selected);
    }

    #[test]
    fn get_owned_fails_for_other_user() {
        let (mut store, user_id) = get_test_store();

        let inserted = insert_expense(
            &mut store,
            user_id,
            10.0,
            Category::Food,
            date!(2024 - 01 - 15),
        );
        let result = store.get_owned(inserted.id, UserID::new(user_id.as_i64() + 1));

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_query_filters_by_category() {
        let (mut store, user_id) = get_test_store();

        let food = insert_expense(
            &mut store,
            user_id,
            10.0,
            Category::Food,
            date!(2024 - 01 - 15),
        );
        insert_expense(
            &mut store,
            user_id,
            20.0,
            Category::Housing,
            date!(2024 - 01 - 16),
        );

        let results = store
            .get_query(ExpenseQuery {
                user_id,
                category: Some(Category::Food),
                date_range: None,
            })
            .unwrap();

        assert_eq!(results, vec![food]);
    }

    #[test]
    fn get_query_filters_by_date_range_inclusive() {
        let (mut store, user_id) = get_test_store();

        insert_expense(
            &mut store,
            user_id,
            1.0,
            Category::Food,
            date!(2024 - 01 - 14),
        );
        let on_start = insert_expense(
            &mut store,
            user_id,
            2.0,
            Category::Food,
            date!(2024 - 01 - 15),
        );
        let on_end = insert_expense(
            &mut store,
            user_id,
            3.0,
            Category::Food,
            date!(2024 - 01 - 20),
        );
        insert_expense(
            &mut store,
            user_id,
            4.0,
            Category::Food,
            date!(2024 - 01 - 21),
        );

        let results = store
            .get_query(ExpenseQuery {
                user_id,
                category: None,
                date_range: Some(date!(2024 - 01 - 15)..=date!(2024 - 01 - 20)),
            })
            .unwrap();

        assert_eq!(results, vec![on_start, on_end]);
    }

    #[test]
    fn update_overwrites_fields() {
        let (mut store, user_id) = get_test_store();

        let mut expense = insert_expense(
            &mut store,
            user_id,
            10.0,
            Category::Food,
            date!(2024 - 01 - 15),
        );
        expense.amount = 99.0;
        expense.description = "groceries".to_string();

        store.update(&expense).unwrap();

        assert_eq!(store.get(expense.id).unwrap(), expense);
    }

    #[test]
    fn delete_removes_the_expense() {
        let (mut store, user_id) = get_test_store();

        let expense = insert_expense(
            &mut store,
            user_id,
            10.0,
            Category::Food,
            date!(2024 - 01 - 15),
        );

        store.delete(expense.id).unwrap();

        assert_eq!(store.get(expense.id), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_on_unknown_id() {
        let (mut store, _) = get_test_store();

        assert_eq!(store.delete(999), Err(Error::NotFound));
    }
}
