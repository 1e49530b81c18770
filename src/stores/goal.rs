//! Defines the goal store trait.

use crate::{
    Error,
    models::{DatabaseID, Goal, NewGoal, UserID},
};

/// Handles the creation and retrieval of savings goals.
pub trait GoalStore {
    /// Create a new goal in the store.
    fn create(&mut self, new_goal: NewGoal) -> Result<Goal, Error>;

    /// Retrieve a goal by its ID alone, regardless of owner.
    fn get(&self, id: DatabaseID) -> Result<Goal, Error>;

    /// Retrieve a goal by its ID and owner.
    ///
    /// Returns [Error::NotFound] whether the goal is absent or owned by a
    /// different user.
    fn get_owned(&self, id: DatabaseID, user_id: UserID) -> Result<Goal, Error>;

    /// Retrieve all goals owned by `user_id`.
    fn get_for_user(&self, user_id: UserID) -> Result<Vec<Goal>, Error>;

    /// Overwrite the stored goal with the same ID as `goal`.
    fn update(&mut self, goal: &Goal) -> Result<(), Error>;

    /// Remove a goal from the store.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;
}
