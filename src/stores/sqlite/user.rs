//! Implements a SQLite backed user store.
use std::sync::{Arc, Mutex};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{NewUser, PasswordHash, User, UserID},
    stores::UserStore,
};

/// Stores users in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// Create a new user in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateEmail] if the email is already registered,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO user (name, email, password_hash)
                 VALUES (?1, ?2, ?3)
                 RETURNING id, name, email, password_hash",
            )?
            .query_row(
                (
                    new_user.name,
                    new_user.email.to_string(),
                    new_user.password_hash.to_string(),
                ),
                Self::map_row,
            )?;

        Ok(user)
    }

    /// Retrieve a user in the database by their `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: UserID) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, email, password_hash FROM user WHERE id = :id")?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(user)
    }

    /// Retrieve a user in the database by their `email`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no user is registered with `email`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, email, password_hash FROM user WHERE email = :email")?
            .query_row(&[(":email", &email.to_string())], Self::map_row)?;

        Ok(user)
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE user (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let name = row.get(offset + 1)?;
        let email: String = row.get(offset + 2)?;
        let email = email.parse().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 2,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::other(format!(
                    "invalid email in database: {error}"
                ))),
            )
        })?;
        let password_hash: String = row.get(offset + 3)?;

        Ok(User {
            id,
            name,
            email,
            password_hash: PasswordHash::new_unchecked(&password_hash),
        })
    }
}
