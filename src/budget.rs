//! The budget API: spending caps per category, reported alongside how much of
//! each cap has been spent.
//!
//! The spent/remaining projection is computed at read time by summing the
//! owner's expenses that share the budget's category and fall inside its
//! window. It is never persisted, so re-reading a budget is side-effect free.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    app_state::BudgetState,
    auth::Claims,
    models::{Budget, Category, DatabaseID, NewBudget, Period},
    response::ApiResponse,
    stores::{BudgetStore, ExpenseQuery, ExpenseStore},
};

/// A budget as reported to clients: the stored fields plus the read-time
/// spent/remaining projection.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetWithSpent {
    /// The stored budget.
    #[serde(flatten)]
    pub budget: Budget,
    /// The sum of the owner's expenses in the budget's category and window.
    pub spent: f64,
    /// The cap minus `spent`. Negative when the budget is blown.
    pub remaining: f64,
}

/// Attach the spent/remaining projection to `budget`.
///
/// Budgets without an end date are summed up to today.
pub(crate) fn with_spent<E>(expense_store: &E, budget: Budget) -> Result<BudgetWithSpent, Error>
where
    E: ExpenseStore,
{
    let window_end = budget
        .end_date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    let spent = expense_store
        .get_query(ExpenseQuery {
            user_id: budget.user_id,
            category: Some(budget.category),
            date_range: Some(budget.start_date..=window_end),
        })?
        .iter()
        .map(|expense| expense.amount)
        .sum::<f64>();

    let remaining = budget.amount - spent;

    Ok(BudgetWithSpent {
        budget,
        spent,
        remaining,
    })
}

/// The data for creating a budget.
#[derive(Debug, Deserialize)]
pub struct CreateBudget {
    /// The category the budget caps.
    pub category: Category,
    /// The spending cap.
    pub amount: f64,
    /// The recurrence unit of the budget window. Defaults to monthly.
    pub period: Option<Period>,
    /// The first day of the budget window. Defaults to today.
    pub start_date: Option<Date>,
}

/// The data for updating a budget. Absent fields are left unchanged.
///
/// The end date cannot be set directly: it is re-derived whenever the period
/// or start date changes.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBudget {
    /// The category the budget caps.
    pub category: Option<Category>,
    /// The spending cap.
    pub amount: Option<f64>,
    /// The recurrence unit of the budget window.
    pub period: Option<Period>,
    /// The first day of the budget window.
    pub start_date: Option<Date>,
}

/// Handler that lists all of the signed-in user's budgets with their
/// projections.
pub async fn get_budgets<B, E>(
    claims: Claims,
    State(state): State<BudgetState<B, E>>,
) -> Result<Json<ApiResponse<Vec<BudgetWithSpent>>>, Error>
where
    B: BudgetStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    let budgets = state
        .budget_store
        .get_for_user(claims.user_id())?
        .into_iter()
        .map(|budget| with_spent(&state.expense_store, budget))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApiResponse::list(budgets)))
}

/// Handler that fetches a single budget by ID, with its projection.
pub async fn get_budget<B, E>(
    claims: Claims,
    State(state): State<BudgetState<B, E>>,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Json<ApiResponse<BudgetWithSpent>>, Error>
where
    B: BudgetStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    let budget = state.budget_store.get_owned(budget_id, claims.user_id())?;

    Ok(Json(ApiResponse::data(with_spent(
        &state.expense_store,
        budget,
    )?)))
}

/// Handler that creates a budget for the signed-in user.
///
/// # Errors
///
/// Returns a 400 response if the amount is not positive.
pub async fn create_budget<B, E>(
    claims: Claims,
    State(mut state): State<BudgetState<B, E>>,
    Json(data): Json<CreateBudget>,
) -> Result<impl IntoResponse, Error>
where
    B: BudgetStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    let start_date = data
        .start_date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    let budget = state.budget_store.create(NewBudget::new(
        claims.user_id(),
        data.category,
        data.amount,
        data.period.unwrap_or_default(),
        start_date,
    )?)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(with_spent(&state.expense_store, budget)?)),
    ))
}

/// Handler that updates a budget, leaving absent fields unchanged.
///
/// Changing the period or start date re-derives the end date; otherwise the
/// stored end date is kept as is.
///
/// # Errors
///
/// This function will return a:
/// - 404 response if the budget does not exist,
/// - 401 response if the budget belongs to a different user,
/// - 400 response if the merged record fails validation.
pub async fn update_budget<B, E>(
    claims: Claims,
    State(mut state): State<BudgetState<B, E>>,
    Path(budget_id): Path<DatabaseID>,
    Json(data): Json<UpdateBudget>,
) -> Result<Json<ApiResponse<BudgetWithSpent>>, Error>
where
    B: BudgetStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    let budget = state.budget_store.get(budget_id)?;

    if budget.user_id != claims.user_id() {
        return Err(Error::Forbidden);
    }

    let window_changed = data.period.is_some() || data.start_date.is_some();

    let merged = NewBudget::new(
        budget.user_id,
        data.category.unwrap_or(budget.category),
        data.amount.unwrap_or(budget.amount),
        data.period.unwrap_or(budget.period),
        data.start_date.unwrap_or(budget.start_date),
    )?;

    let end_date = if window_changed {
        Some(merged.end_date)
    } else {
        budget.end_date
    };

    let updated = Budget {
        id: budget.id,
        user_id: merged.user_id,
        category: merged.category,
        amount: merged.amount,
        period: merged.period,
        start_date: merged.start_date,
        end_date,
    };

    state.budget_store.update(&updated)?;

    Ok(Json(ApiResponse::data(with_spent(
        &state.expense_store,
        updated,
    )?)))
}

/// Handler that deletes a budget.
///
/// # Errors
///
/// This function will return a:
/// - 404 response if the budget does not exist,
/// - 401 response if the budget belongs to a different user.
pub async fn delete_budget<B, E>(
    claims: Claims,
    State(mut state): State<BudgetState<B, E>>,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Json<ApiResponse<()>>, Error>
where
    B: BudgetStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    let budget = state.budget_store.get(budget_id)?;

    if budget.user_id != claims.user_id() {
        return Err(Error::Forbidden);
    }

    state.budget_store.delete(budget_id)?;

    Ok(Json(ApiResponse::message("Budget removed".to_string())))
}
