//! Implements a SQLite backed goal store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Goal, NewGoal, UserID},
    stores::GoalStore,
};

/// Stores savings goals in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteGoalStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteGoalStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const GOAL_COLUMNS: &str =
    "id, user_id, title, target_amount, current_amount, target_date, description";

impl GoalStore for SQLiteGoalStore {
    /// Create a new goal in the database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    fn create(&mut self, new_goal: NewGoal) -> Result<Goal, Error> {
        let goal = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO goal (user_id, title, target_amount, current_amount, target_date, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {GOAL_COLUMNS}",
            ))?
            .query_row(
                (
                    new_goal.user_id,
                    new_goal.title,
                    new_goal.target_amount,
                    new_goal.current_amount,
                    new_goal.target_date,
                    new_goal.description,
                ),
                Self::map_row,
            )?;

        Ok(goal)
    }

    /// Retrieve a goal in the database by its `id`, regardless of owner.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid goal,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Goal, Error> {
        let goal = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!("SELECT {GOAL_COLUMNS} FROM goal WHERE id = :id"))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(goal)
    }

    /// Retrieve a goal by its `id` and owner.
    ///
    /// The ownership check is folded into the query so "not found" and "not
    /// yours" are indistinguishable to the caller.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if there is no goal with `id` owned by `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_owned(&self, id: DatabaseID, user_id: UserID) -> Result<Goal, Error> {
        let goal = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goal WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                &[(":id", &id), (":user_id", &user_id.as_i64())],
                Self::map_row,
            )?;

        Ok(goal)
    }

    /// Retrieve all goals owned by `user_id`.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is a SQL error.
    fn get_for_user(&self, user_id: UserID) -> Result<Vec<Goal>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goal WHERE user_id = :user_id ORDER BY id ASC"
            ))?
            .query_map(&[(":user_id", &user_id)], Self::map_row)?
            .map(|maybe_goal| maybe_goal.map_err(Error::SqlError))
            .collect()
    }

    /// Overwrite the stored goal with the same ID as `goal`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the goal is not in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, goal: &Goal) -> Result<(), Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE goal
             SET title = ?1, target_amount = ?2, current_amount = ?3,
                 target_date = ?4, description = ?5
             WHERE id = ?6",
            (
                &goal.title,
                goal.target_amount,
                goal.current_amount,
                goal.target_date,
                &goal.description,
                goal.id,
            ),
        )?;

        if rows_updated == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    /// Remove a goal from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the goal is not in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM goal WHERE id = ?1", (id,))?;

        if rows_deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

impl CreateTable for SQLiteGoalStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE goal (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    target_amount REAL NOT NULL,
                    current_amount REAL NOT NULL DEFAULT 0,
                    target_date TEXT NOT NULL,
                    description TEXT,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteGoalStore {
    type ReturnType = Goal;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = row.get(offset + 1)?;
        let title = row.get(offset + 2)?;
        let target_amount = row.get(offset + 3)?;
        let current_amount = row.get(offset + 4)?;
        let target_date = row.get(offset + 5)?;
        let description = row.get(offset + 6)?;

        Ok(Goal {
            id,
            user_id,
            title,
            target_amount,
            current_amount,
            target_date,
            description,
        })
    }
}
