//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}',
//! use [format_endpoint].

/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for signing in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route describing the signed-in user.
pub const ME: &str = "/api/auth/me";

/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to access a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to list expenses in a single category.
pub const EXPENSES_BY_CATEGORY: &str = "/api/expenses/category/{category}";
/// The route to list expenses in an inclusive date range.
pub const EXPENSES_BY_DATE_RANGE: &str = "/api/expenses/date/{start_date}/{end_date}";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";

/// The route to list and create savings goals.
pub const GOALS: &str = "/api/goals";
/// The route to access a single savings goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to record progress towards a savings goal.
pub const GOAL_PROGRESS: &str = "/api/goals/{goal_id}/progress";

/// The route for total spending per category.
pub const REPORT_EXPENSE_SUMMARY: &str = "/api/reports/expenses/summary";
/// The route comparing each budget against actual spending.
pub const REPORT_BUDGET_VS_ACTUAL: &str = "/api/reports/budget-vs-actual";
/// The route summarising progress towards each savings goal.
pub const REPORT_GOALS_PROGRESS: &str = "/api/reports/goals-progress";
/// The route for downloading the expense report as a PDF.
pub const REPORT_EXPENSES_PDF: &str = "/api/reports/expenses/pdf";
/// The route for downloading the expense report as a CSV.
pub const REPORT_EXPENSES_CSV: &str = "/api/reports/expenses/csv";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/expenses/{expense_id}',
/// '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
