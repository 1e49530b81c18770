//! The savings goal API: create, query, update, and delete goals, plus a
//! dedicated progress endpoint for recording saved amounts.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::GoalState,
    auth::Claims,
    models::{DatabaseID, Goal, NewGoal},
    response::ApiResponse,
    stores::GoalStore,
};

/// The data for creating a savings goal.
#[derive(Debug, Deserialize)]
pub struct CreateGoal {
    /// What the user is saving for.
    pub title: String,
    /// The amount the user wants to save.
    pub target_amount: f64,
    /// The amount already saved. Defaults to zero.
    pub current_amount: Option<f64>,
    /// The day the user wants the goal met by.
    pub target_date: Date,
    /// An optional longer description of the goal.
    pub description: Option<String>,
}

/// The data for updating a goal. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGoal {
    /// What the user is saving for.
    pub title: Option<String>,
    /// The amount the user wants to save.
    pub target_amount: Option<f64>,
    /// The amount saved so far.
    pub current_amount: Option<f64>,
    /// The day the user wants the goal met by.
    pub target_date: Option<Date>,
    /// A longer description of the goal. An explicit null clears it.
    #[serde(default)]
    pub description: Option<Option<String>>,
}

/// The data for recording progress towards a goal.
///
/// When both fields are present the added amount wins.
#[derive(Debug, Default, Deserialize)]
pub struct GoalProgress {
    /// An amount to add to the current amount. May be negative.
    pub amount_to_add: Option<f64>,
    /// A value to replace the current amount with.
    pub current_amount: Option<f64>,
}

/// Handler that lists all of the signed-in user's goals.
pub async fn get_goals<G>(
    claims: Claims,
    State(state): State<GoalState<G>>,
) -> Result<Json<ApiResponse<Vec<Goal>>>, Error>
where
    G: GoalStore + Send + Sync,
{
    let goals = state.goal_store.get_for_user(claims.user_id())?;

    Ok(Json(ApiResponse::list(goals)))
}

/// Handler that fetches a single goal by ID.
pub async fn get_goal<G>(
    claims: Claims,
    State(state): State<GoalState<G>>,
    Path(goal_id): Path<DatabaseID>,
) -> Result<Json<ApiResponse<Goal>>, Error>
where
    G: GoalStore + Send + Sync,
{
    let goal = state.goal_store.get_owned(goal_id, claims.user_id())?;

    Ok(Json(ApiResponse::data(goal)))
}

/// Handler that creates a goal for the signed-in user.
///
/// # Errors
///
/// Returns a 400 response if the title is empty, the target amount is not
/// positive, or the current amount is negative.
pub async fn create_goal<G>(
    claims: Claims,
    State(mut state): State<GoalState<G>>,
    Json(data): Json<CreateGoal>,
) -> Result<impl IntoResponse, Error>
where
    G: GoalStore + Send + Sync,
{
    let goal = state.goal_store.create(NewGoal::new(
        claims.user_id(),
        &data.title,
        data.target_amount,
        data.current_amount,
        data.target_date,
        data.description,
    )?)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(goal))))
}

/// Handler that updates a goal, leaving absent fields unchanged.
///
/// The merged record goes through the same validation and clamping as
/// creation, so lowering the target also lowers an over-target current
/// amount.
///
/// # Errors
///
/// This function will return a:
/// - 404 response if the goal does not exist,
/// - 401 response if the goal belongs to a different user,
/// - 400 response if the merged record fails validation.
pub async fn update_goal<G>(
    claims: Claims,
    State(mut state): State<GoalState<G>>,
    Path(goal_id): Path<DatabaseID>,
    Json(data): Json<UpdateGoal>,
) -> Result<Json<ApiResponse<Goal>>, Error>
where
    G: GoalStore + Send + Sync,
{
    let goal = state.goal_store.get(goal_id)?;

    if goal.user_id != claims.user_id() {
        return Err(Error::Forbidden);
    }

    let merged = NewGoal::new(
        goal.user_id,
        &data.title.unwrap_or(goal.title),
        data.target_amount.unwrap_or(goal.target_amount),
        Some(data.current_amount.unwrap_or(goal.current_amount)),
        data.target_date.unwrap_or(goal.target_date),
        data.description.unwrap_or(goal.description),
    )?;

    let updated = Goal {
        id: goal.id,
        user_id: merged.user_id,
        title: merged.title,
        target_amount: merged.target_amount,
        current_amount: merged.current_amount,
        target_date: merged.target_date,
        description: merged.description,
    };

    state.goal_store.update(&updated)?;

    Ok(Json(ApiResponse::data(updated)))
}

/// Handler that records progress towards a goal.
///
/// The resulting amount is clamped so it never exceeds the target.
///
/// # Errors
///
/// This function will return a:
/// - 404 response if the goal does not exist,
/// - 401 response if the goal belongs to a different user.
pub async fn update_goal_progress<G>(
    claims: Claims,
    State(mut state): State<GoalState<G>>,
    Path(goal_id): Path<DatabaseID>,
    Json(data): Json<GoalProgress>,
) -> Result<Json<ApiResponse<Goal>>, Error>
where
    G: GoalStore + Send + Sync,
{
    let mut goal = state.goal_store.get(goal_id)?;

    if goal.user_id != claims.user_id() {
        return Err(Error::Forbidden);
    }

    goal.apply_progress(data.amount_to_add, data.current_amount);

    state.goal_store.update(&goal)?;

    Ok(Json(ApiResponse::data(goal)))
}

/// Handler that deletes a goal.
///
/// # Errors
///
/// This function will return a:
/// - 404 response if the goal does not exist,
/// - 401 response if the goal belongs to a different user.
pub async fn delete_goal<G>(
    claims: Claims,
    State(mut state): State<GoalState<G>>,
    Path(goal_id): Path<DatabaseID>,
) -> Result<Json<ApiResponse<()>>, Error>
where
    G: GoalStore + Send + Sync,
{
    let goal = state.goal_store.get(goal_id)?;

    if goal.user_id != claims.user_id() {
        return Err(Error::Forbidden);
    }

    state.goal_store.delete(goal_id)?;

    Ok(Json(ApiResponse::message("Goal removed".to_string())))
}
