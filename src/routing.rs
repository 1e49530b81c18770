//! Application router configuration.
//!
//! There is no auth middleware layer: protected handlers each take a
//! [Claims](crate::auth::Claims) argument, so axum rejects requests without a
//! valid bearer token before the handler body runs.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState, auth,
    budget::{create_budget, delete_budget, get_budget, get_budgets, update_budget},
    endpoints,
    expense::{
        create_expense, delete_expense, get_expense, get_expenses, get_expenses_by_category,
        get_expenses_by_date_range, update_expense,
    },
    goal::{
        create_goal, delete_goal, get_goal, get_goals, update_goal, update_goal_progress,
    },
    report::{
        download_expenses_csv, download_expenses_pdf, get_budget_vs_actual, get_expense_summary,
        get_goals_progress,
    },
    stores::{BudgetStore, ExpenseStore, GoalStore, UserStore},
};

/// Return a router with all the app's routes.
pub fn build_router<U, E, B, G>(state: AppState<U, E, B, G>) -> Router
where
    U: UserStore + Clone + Send + Sync + 'static,
    E: ExpenseStore + Clone + Send + Sync + 'static,
    B: BudgetStore + Clone + Send + Sync + 'static,
    G: GoalStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::REGISTER, post(auth::register::<U>))
        .route(endpoints::LOG_IN, post(auth::sign_in::<U>))
        .route(endpoints::ME, get(auth::get_me::<U>))
        .route(
            endpoints::EXPENSES,
            get(get_expenses::<E>).post(create_expense::<E>),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense::<E>)
                .put(update_expense::<E>)
                .delete(delete_expense::<E>),
        )
        .route(
            endpoints::EXPENSES_BY_CATEGORY,
            get(get_expenses_by_category::<E>),
        )
        .route(
            endpoints::EXPENSES_BY_DATE_RANGE,
            get(get_expenses_by_date_range::<E>),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets::<B, E>).post(create_budget::<B, E>),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget::<B, E>)
                .put(update_budget::<B, E>)
                .delete(delete_budget::<B, E>),
        )
        .route(endpoints::GOALS, get(get_goals::<G>).post(create_goal::<G>))
        .route(
            endpoints::GOAL,
            get(get_goal::<G>)
                .put(update_goal::<G>)
                .delete(delete_goal::<G>),
        )
        .route(endpoints::GOAL_PROGRESS, put(update_goal_progress::<G>))
        .route(
            endpoints::REPORT_EXPENSE_SUMMARY,
            get(get_expense_summary::<E, B, G>),
        )
        .route(
            endpoints::REPORT_BUDGET_VS_ACTUAL,
            get(get_budget_vs_actual::<E, B, G>),
        )
        .route(
            endpoints::REPORT_GOALS_PROGRESS,
            get(get_goals_progress::<E, B, G>),
        )
        .route(
            endpoints::REPORT_EXPENSES_PDF,
            get(download_expenses_pdf::<E, B, G>),
        )
        .route(
            endpoints::REPORT_EXPENSES_CSV,
            get(download_expenses_csv::<E, B, G>),
        )
        .with_state(state)
}
