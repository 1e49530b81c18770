//! Implements a struct that holds the state of the REST server.

use std::{
    marker::{Send, Sync},
    sync::Arc,
};

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{
    render::DocumentRenderer,
    stores::{BudgetStore, ExpenseStore, GoalStore, UserStore},
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState<U, E, B, G>
where
    U: UserStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    /// The key used for signing access tokens.
    pub encoding_key: EncodingKey,
    /// The key used for verifying access tokens.
    pub decoding_key: DecodingKey,
    /// The store for managing [users](crate::models::User).
    pub user_store: U,
    /// The store for managing user [expenses](crate::models::Expense).
    pub expense_store: E,
    /// The store for managing user [budgets](crate::models::Budget).
    pub budget_store: B,
    /// The store for managing user [goals](crate::models::Goal).
    pub goal_store: G,
    /// Renders tabular report documents (PDF and CSV).
    pub renderer: Arc<dyn DocumentRenderer + Send + Sync>,
}

impl<U, E, B, G> AppState<U, E, B, G>
where
    U: UserStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    /// Create a new [AppState].
    ///
    /// `jwt_secret` is the secret used to sign and verify access tokens.
    pub fn new(
        jwt_secret: &str,
        user_store: U,
        expense_store: E,
        budget_store: B,
        goal_store: G,
        renderer: Arc<dyn DocumentRenderer + Send + Sync>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            user_store,
            expense_store,
            budget_store,
            goal_store,
            renderer,
        }
    }
}

/// The state needed to verify and issue access tokens.
#[derive(Clone)]
pub struct AuthState {
    /// The key used for signing access tokens.
    pub encoding_key: EncodingKey,
    /// The key used for verifying access tokens.
    pub decoding_key: DecodingKey,
}

impl<U, E, B, G> FromRef<AppState<U, E, B, G>> for AuthState
where
    U: UserStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, E, B, G>) -> Self {
        Self {
            encoding_key: state.encoding_key.clone(),
            decoding_key: state.decoding_key.clone(),
        }
    }
}

/// The state needed to register, sign in, and describe users.
#[derive(Clone)]
pub struct UserState<U>
where
    U: UserStore + Send + Sync,
{
    /// The store for managing [users](crate::models::User).
    pub user_store: U,
    /// The key used for signing access tokens.
    pub encoding_key: EncodingKey,
}

impl<U, E, B, G> FromRef<AppState<U, E, B, G>> for UserState<U>
where
    U: UserStore + Clone + Send + Sync,
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, E, B, G>) -> Self {
        Self {
            user_store: state.user_store.clone(),
            encoding_key: state.encoding_key.clone(),
        }
    }
}

/// The state needed to get or create an expense.
#[derive(Debug, Clone)]
pub struct ExpenseState<E>
where
    E: ExpenseStore + Send + Sync,
{
    /// The store for managing user [expenses](crate::models::Expense).
    pub expense_store: E,
}

impl<U, E, B, G> FromRef<AppState<U, E, B, G>> for ExpenseState<E>
where
    U: UserStore + Send + Sync,
    E: ExpenseStore + Clone + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, E, B, G>) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
        }
    }
}

/// The state needed to get or create a budget.
///
/// Carries the expense store as well because budget responses report how much
/// of the budget has been spent.
#[derive(Debug, Clone)]
pub struct BudgetState<B, E>
where
    B: BudgetStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    /// The store for managing user [budgets](crate::models::Budget).
    pub budget_store: B,
    /// The store for managing user [expenses](crate::models::Expense).
    pub expense_store: E,
}

impl<U, E, B, G> FromRef<AppState<U, E, B, G>> for BudgetState<B, E>
where
    U: UserStore + Send + Sync,
    E: ExpenseStore + Clone + Send + Sync,
    B: BudgetStore + Clone + Send + Sync,
    G: GoalStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, E, B, G>) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
            expense_store: state.expense_store.clone(),
        }
    }
}

/// The state needed to get or create a savings goal.
#[derive(Debug, Clone)]
pub struct GoalState<G>
where
    G: GoalStore + Send + Sync,
{
    /// The store for managing user [goals](crate::models::Goal).
    pub goal_store: G,
}

impl<U, E, B, G> FromRef<AppState<U, E, B, G>> for GoalState<G>
where
    U: UserStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<U, E, B, G>) -> Self {
        Self {
            goal_store: state.goal_store.clone(),
        }
    }
}

/// The state needed to build reports over a user's records.
#[derive(Clone)]
pub struct ReportState<E, B, G>
where
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    /// The store for managing user [expenses](crate::models::Expense).
    pub expense_store: E,
    /// The store for managing user [budgets](crate::models::Budget).
    pub budget_store: B,
    /// The store for managing user [goals](crate::models::Goal).
    pub goal_store: G,
    /// Renders tabular report documents (PDF and CSV).
    pub renderer: Arc<dyn DocumentRenderer + Send + Sync>,
}

impl<U, E, B, G> FromRef<AppState<U, E, B, G>> for ReportState<E, B, G>
where
    U: UserStore + Send + Sync,
    E: ExpenseStore + Clone + Send + Sync,
    B: BudgetStore + Clone + Send + Sync,
    G: GoalStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<U, E, B, G>) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            budget_store: state.budget_store.clone(),
            goal_store: state.goal_store.clone(),
            renderer: state.renderer.clone(),
        }
    }
}
