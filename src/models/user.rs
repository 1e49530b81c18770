//! This file defines a user of the application and its supporting types.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, models::PasswordHash};

/// A newtype wrapper for integer user IDs.
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a user ID from a raw database ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw database ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.0.into())
    }
}

impl FromSql for UserID {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(UserID)
    }
}

/// A registered user of the application.
///
/// The user owns all other records by reference: every expense, budget, and
/// goal carries the ID of the user that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the database.
    pub id: UserID,

    /// The display name given at registration.
    pub name: String,

    /// The email address used to log in. Unique across users.
    pub email: EmailAddress,

    /// The user's hashed password.
    pub password_hash: PasswordHash,
}

/// The data required to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The display name given at registration.
    pub name: String,

    /// The email address used to log in.
    pub email: EmailAddress,

    /// The user's hashed password.
    pub password_hash: PasswordHash,
}

impl NewUser {
    /// Create the data for a new user.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyField] if `name` is empty or whitespace.
    pub fn new(name: &str, email: EmailAddress, password_hash: PasswordHash) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyField("name"));
        }

        Ok(Self {
            name: name.to_string(),
            email,
            password_hash,
        })
    }
}
