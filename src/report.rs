//! Read-only reports derived from a user's expenses, budgets, and goals,
//! including PDF and CSV downloads of the expense history.
//!
//! Reports never write anything: each one is recomputed from the stores on
//! every request.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::State,
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    app_state::ReportState,
    auth::Claims,
    budget::with_spent,
    models::{Category, DatabaseID, Expense},
    response::ApiResponse,
    stores::{BudgetStore, ExpenseQuery, ExpenseStore, GoalStore},
};

/// Total spending per category, along with the overall total.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseSummary {
    /// Total spending per category. Categories with no expenses are omitted.
    pub categories: BTreeMap<Category, f64>,
    /// Total spending across all categories.
    pub total: f64,
}

/// One budget compared against actual spending in its window.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetComparison {
    /// The ID of the budget.
    pub budget_id: DatabaseID,
    /// The category the budget caps.
    pub category: Category,
    /// The spending cap.
    pub budgeted: f64,
    /// Actual spending in the budget's category and window.
    pub spent: f64,
    /// The cap minus actual spending. Negative when the budget is blown.
    pub remaining: f64,
    /// Spending as a percentage of the cap.
    pub percentage: f64,
}

/// Progress towards one savings goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalProgressSummary {
    /// The ID of the goal.
    pub goal_id: DatabaseID,
    /// What the user is saving for.
    pub title: String,
    /// The amount the user wants to save.
    pub target_amount: f64,
    /// The amount saved so far.
    pub current_amount: f64,
    /// Saved amount as a percentage of the target.
    pub progress: f64,
    /// The day the user wants the goal met by.
    pub target_date: Date,
    /// Whole days until the target date. Negative once the date has passed.
    pub days_remaining: i64,
}

/// Handler that totals the signed-in user's spending per category.
pub async fn get_expense_summary<E, B, G>(
    claims: Claims,
    State(state): State<ReportState<E, B, G>>,
) -> Result<Json<ApiResponse<ExpenseSummary>>, Error>
where
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    let expenses = state
        .expense_store
        .get_query(ExpenseQuery::for_user(claims.user_id()))?;

    let mut categories: BTreeMap<Category, f64> = BTreeMap::new();
    let mut total = 0.0;

    for expense in &expenses {
        *categories.entry(expense.category).or_insert(0.0) += expense.amount;
        total += expense.amount;
    }

    Ok(Json(ApiResponse::data(ExpenseSummary { categories, total })))
}

/// Handler that compares each of the signed-in user's budgets against actual
/// spending.
pub async fn get_budget_vs_actual<E, B, G>(
    claims: Claims,
    State(state): State<ReportState<E, B, G>>,
) -> Result<Json<ApiResponse<Vec<BudgetComparison>>>, Error>
where
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    let comparisons = state
        .budget_store
        .get_for_user(claims.user_id())?
        .into_iter()
        .map(|budget| {
            let projected = with_spent(&state.expense_store, budget)?;

            // Budget amounts are validated to be positive, so the percentage
            // is always well defined.
            Ok(BudgetComparison {
                budget_id: projected.budget.id,
                category: projected.budget.category,
                budgeted: projected.budget.amount,
                spent: projected.spent,
                remaining: projected.remaining,
                percentage: projected.spent / projected.budget.amount * 100.0,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(Json(ApiResponse::list(comparisons)))
}

/// Handler that summarises progress towards each of the signed-in user's
/// goals.
pub async fn get_goals_progress<E, B, G>(
    claims: Claims,
    State(state): State<ReportState<E, B, G>>,
) -> Result<Json<ApiResponse<Vec<GoalProgressSummary>>>, Error>
where
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    let today = OffsetDateTime::now_utc().date();

    let summaries = state
        .goal_store
        .get_for_user(claims.user_id())?
        .into_iter()
        .map(|goal| GoalProgressSummary {
            goal_id: goal.id,
            title: goal.title,
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            progress: goal.current_amount / goal.target_amount * 100.0,
            target_date: goal.target_date,
            days_remaining: (goal.target_date - today).whole_days(),
        })
        .collect();

    Ok(Json(ApiResponse::list(summaries)))
}

const EXPENSE_REPORT_TITLE: &str = "Expense Report";
const EXPENSE_REPORT_COLUMNS: [&str; 4] = ["Description", "Amount", "Category", "Date"];

/// Rows for the PDF table, with the amount formatted as currency.
fn formatted_expense_rows(expenses: &[Expense]) -> Vec<Vec<String>> {
    expenses
        .iter()
        .map(|expense| {
            vec![
                expense.description.clone(),
                format!("${:.2}", expense.amount),
                expense.category.to_string(),
                expense.date.to_string(),
            ]
        })
        .collect()
}

/// Rows for the CSV export, with the raw unformatted amount.
fn raw_expense_rows(expenses: &[Expense]) -> Vec<Vec<String>> {
    expenses
        .iter()
        .map(|expense| {
            vec![
                expense.description.clone(),
                expense.amount.to_string(),
                expense.category.to_string(),
                expense.date.to_string(),
            ]
        })
        .collect()
}

/// Handler that renders the signed-in user's expense history as a PDF
/// download.
pub async fn download_expenses_pdf<E, B, G>(
    claims: Claims,
    State(state): State<ReportState<E, B, G>>,
) -> Result<impl IntoResponse, Error>
where
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    let expenses = state
        .expense_store
        .get_query(ExpenseQuery::for_user(claims.user_id()))?;

    let document = state.renderer.render_table(
        EXPENSE_REPORT_TITLE,
        &EXPENSE_REPORT_COLUMNS,
        &formatted_expense_rows(&expenses),
    )?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=expense-report.pdf",
            ),
        ],
        document,
    ))
}

/// Handler that renders the signed-in user's expense history as a CSV
/// download.
pub async fn download_expenses_csv<E, B, G>(
    claims: Claims,
    State(state): State<ReportState<E, B, G>>,
) -> Result<impl IntoResponse, Error>
where
    E: ExpenseStore + Send + Sync,
    B: BudgetStore + Send + Sync,
    G: GoalStore + Send + Sync,
{
    let expenses = state
        .expense_store
        .get_query(ExpenseQuery::for_user(claims.user_id()))?;

    let document = state
        .renderer
        .render_csv(&EXPENSE_REPORT_COLUMNS, &raw_expense_rows(&expenses))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=expense-report.csv",
            ),
        ],
        document,
    ))
}
