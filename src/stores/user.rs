//! Defines the user store trait.

use email_address::EmailAddress;

use crate::{
    Error,
    models::{NewUser, User, UserID},
};

/// Handles the creation and retrieval of users.
pub trait UserStore {
    /// Create a new user in the store.
    ///
    /// Implementers should return [Error::DuplicateEmail] if the email is
    /// already registered.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error>;

    /// Retrieve a user by their ID.
    fn get(&self, id: UserID) -> Result<User, Error>;

    /// Retrieve a user by their email address.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error>;
}
