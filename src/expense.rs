//! The expense API: create, query, update, and delete expense records.
//!
//! Reads scope the query to the signed-in user at the store level, so an
//! expense owned by someone else looks identical to one that does not exist.
//! Updates and deletes instead load the record first and compare owners,
//! rejecting a mismatch outright.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    app_state::ExpenseState,
    auth::Claims,
    models::{Category, DatabaseID, Expense, NewExpense, RecurringInterval},
    response::ApiResponse,
    stores::{ExpenseQuery, ExpenseStore},
};

/// The data for creating an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpense {
    /// How much was spent.
    pub amount: f64,
    /// What the expense was for.
    pub description: String,
    /// The category the expense counts against.
    pub category: Category,
    /// The day the expense occurred. Defaults to today.
    pub date: Option<Date>,
    /// Whether the expense repeats. Defaults to false.
    #[serde(default)]
    pub is_recurring: bool,
    /// How often the expense repeats, if it does.
    pub recurring_interval: Option<RecurringInterval>,
}

/// The data for updating an expense. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpense {
    /// How much was spent.
    pub amount: Option<f64>,
    /// What the expense was for.
    pub description: Option<String>,
    /// The category the expense counts against.
    pub category: Option<Category>,
    /// The day the expense occurred.
    pub date: Option<Date>,
    /// Whether the expense repeats.
    pub is_recurring: Option<bool>,
    /// How often the expense repeats. An explicit null clears the interval.
    #[serde(default)]
    pub recurring_interval: Option<Option<RecurringInterval>>,
}

/// Handler that lists all of the signed-in user's expenses.
pub async fn get_expenses<E>(
    claims: Claims,
    State(state): State<ExpenseState<E>>,
) -> Result<Json<ApiResponse<Vec<Expense>>>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let expenses = state
        .expense_store
        .get_query(ExpenseQuery::for_user(claims.user_id()))?;

    Ok(Json(ApiResponse::list(expenses)))
}

/// Handler that fetches a single expense by ID.
pub async fn get_expense<E>(
    claims: Claims,
    State(state): State<ExpenseState<E>>,
    Path(expense_id): Path<DatabaseID>,
) -> Result<Json<ApiResponse<Expense>>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let expense = state.expense_store.get_owned(expense_id, claims.user_id())?;

    Ok(Json(ApiResponse::data(expense)))
}

/// Handler that lists the signed-in user's expenses in one category.
pub async fn get_expenses_by_category<E>(
    claims: Claims,
    State(state): State<ExpenseState<E>>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<Vec<Expense>>>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let category = Category::from_str(&category)?;

    let expenses = state.expense_store.get_query(ExpenseQuery {
        category: Some(category),
        ..ExpenseQuery::for_user(claims.user_id())
    })?;

    Ok(Json(ApiResponse::list(expenses)))
}

/// Handler that lists the signed-in user's expenses between two dates,
/// inclusive on both ends.
pub async fn get_expenses_by_date_range<E>(
    claims: Claims,
    State(state): State<ExpenseState<E>>,
    Path((start_date, end_date)): Path<(Date, Date)>,
) -> Result<Json<ApiResponse<Vec<Expense>>>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let expenses = state.expense_store.get_query(ExpenseQuery {
        date_range: Some(start_date..=end_date),
        ..ExpenseQuery::for_user(claims.user_id())
    })?;

    Ok(Json(ApiResponse::list(expenses)))
}

/// Handler that creates an expense for the signed-in user.
///
/// # Errors
///
/// Returns a 400 response if the amount is not positive or the description is
/// empty.
pub async fn create_expense<E>(
    claims: Claims,
    State(mut state): State<ExpenseState<E>>,
    Json(data): Json<CreateExpense>,
) -> Result<impl IntoResponse, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let date = data
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    let expense = state.expense_store.create(NewExpense::new(
        claims.user_id(),
        data.amount,
        &data.description,
        data.category,
        date,
        data.is_recurring,
        data.recurring_interval,
    )?)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(expense))))
}

/// Handler that updates an expense, leaving absent fields unchanged.
///
/// # Errors
///
/// This function will return a:
/// - 404 response if the expense does not exist,
/// - 401 response if the expense belongs to a different user,
/// - 400 response if the merged record fails validation.
pub async fn update_expense<E>(
    claims: Claims,
    State(mut state): State<ExpenseState<E>>,
    Path(expense_id): Path<DatabaseID>,
    Json(data): Json<UpdateExpense>,
) -> Result<Json<ApiResponse<Expense>>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let expense = state.expense_store.get(expense_id)?;

    if expense.user_id != claims.user_id() {
        return Err(Error::Forbidden);
    }

    // Revalidate the merged record so an update cannot sneak in values that
    // would be rejected at creation.
    let merged = NewExpense::new(
        expense.user_id,
        data.amount.unwrap_or(expense.amount),
        &data.description.unwrap_or(expense.description),
        data.category.unwrap_or(expense.category),
        data.date.unwrap_or(expense.date),
        data.is_recurring.unwrap_or(expense.is_recurring),
        data.recurring_interval
            .unwrap_or(expense.recurring_interval),
    )?;

    let updated = Expense {
        id: expense.id,
        user_id: merged.user_id,
        amount: merged.amount,
        description: merged.description,
        category: merged.category,
        date: merged.date,
        is_recurring: merged.is_recurring,
        recurring_interval: merged.recurring_interval,
    };

    state.expense_store.update(&updated)?;

    Ok(Json(ApiResponse::data(updated)))
}

/// Handler that deletes an expense.
///
/// # Errors
///
/// This function will return a:
/// - 404 response if the expense does not exist,
/// - 401 response if the expense belongs to a different user.
pub async fn delete_expense<E>(
    claims: Claims,
    State(mut state): State<ExpenseState<E>>,
    Path(expense_id): Path<DatabaseID>,
) -> Result<Json<ApiResponse<()>>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let expense = state.expense_store.get(expense_id)?;

    if expense.user_id != claims.user_id() {
        return Err(Error::Forbidden);
    }

    state.expense_store.delete(expense_id)?;

    Ok(Json(ApiResponse::message("Expense removed".to_string())))
}

#[cfg(test)]
mod expense_endpoint_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum_test::TestServer;
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        ApiResponse, AppState, TableRenderer,
        auth::encode_jwt,
        build_router,
        db::initialize,
        endpoints::{self, format_endpoint},
        models::{Category, Expense, NewUser, PasswordHash},
        stores::{
            UserStore,
            sqlite::{SQLiteBudgetStore, SQLiteExpenseStore, SQLiteGoalStore, SQLiteUserStore},
        },
    };

    struct TestContext {
        server: TestServer,
        token: String,
        other_token: String,
    }

    fn get_test_context() -> TestContext {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");
        let connection = Arc::new(Mutex::new(connection));

        let mut user_store = SQLiteUserStore::new(connection.clone());
        let user = user_store
            .create(
                NewUser::new(
                    "Jo",
                    EmailAddress::from_str("foo@bar.baz").unwrap(),
                    PasswordHash::new_unchecked("hunter2"),
                )
                .unwrap(),
            )
            .unwrap();
        let other_user = user_store
            .create(
                NewUser::new(
                    "Sam",
                    EmailAddress::from_str("other@bar.baz").unwrap(),
                    PasswordHash::new_unchecked("hunter2"),
                )
                .unwrap(),
            )
            .unwrap();

        let state = AppState::new(
            "foobar",
            user_store,
            SQLiteExpenseStore::new(connection.clone()),
            SQLiteBudgetStore::new(connection.clone()),
            SQLiteGoalStore::new(connection),
            Arc::new(TableRenderer),
        );

        let token = encode_jwt(user.id, &state.encoding_key).unwrap();
        let other_token = encode_jwt(other_user.id, &state.encoding_key).unwrap();

        let server = TestServer::new(build_router(state));

        TestContext {
            server,
            token,
            other_token,
        }
    }

    async fn create_test_expense(context: &TestContext, amount: f64, category: &str) -> Expense {
        let response = context
            .server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&context.token)
            .json(&json!({
                "amount": amount,
                "description": "test expense",
                "category": category,
                "date": "2024-01-15",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);

        response.json::<ApiResponse<Expense>>().data.unwrap()
    }

    #[tokio::test]
    async fn create_expense_defaults_date_to_today() {
        let context = get_test_context();

        let response = context
            .server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&context.token)
            .json(&json!({
                "amount": 9.5,
                "description": "coffee",
                "category": "Food",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);

        let expense = response.json::<ApiResponse<Expense>>().data.unwrap();
        assert_eq!(
            expense.date,
            time::OffsetDateTime::now_utc().date(),
        );
        assert!(!expense.is_recurring);
    }

    #[tokio::test]
    async fn create_expense_fails_with_non_positive_amount() {
        let context = get_test_context();

        context
            .server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&context.token)
            .json(&json!({
                "amount": 0.0,
                "description": "coffee",
                "category": "Food",
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn get_expenses_lists_only_own_expenses() {
        let context = get_test_context();
        create_test_expense(&context, 10.0, "Food").await;
        create_test_expense(&context, 20.0, "Housing").await;

        let response = context
            .server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&context.other_token)
            .await;

        response.assert_status_ok();

        let body = response.json::<ApiResponse<Vec<Expense>>>();
        assert_eq!(body.count, Some(0));

        let response = context
            .server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&context.token)
            .await;

        let body = response.json::<ApiResponse<Vec<Expense>>>();
        assert_eq!(body.count, Some(2));
    }

    #[tokio::test]
    async fn get_expense_of_other_user_is_not_found() {
        let context = get_test_context();
        let expense = create_test_expense(&context, 10.0, "Food").await;

        context
            .server
            .get(&format_endpoint(endpoints::EXPENSE, expense.id))
            .authorization_bearer(&context.other_token)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn get_expenses_by_category_filters() {
        let context = get_test_context();
        create_test_expense(&context, 10.0, "Food").await;
        create_test_expense(&context, 20.0, "Housing").await;

        let response = context
            .server
            .get("/api/expenses/category/Food")
            .authorization_bearer(&context.token)
            .await;

        response.assert_status_ok();

        let body = response.json::<ApiResponse<Vec<Expense>>>();
        assert_eq!(body.count, Some(1));
        assert_eq!(body.data.unwrap()[0].category, Category::Food);
    }

    #[tokio::test]
    async fn get_expenses_by_unknown_category_is_bad_request() {
        let context = get_test_context();

        context
            .server
            .get("/api/expenses/category/Yachts")
            .authorization_bearer(&context.token)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn get_expenses_by_date_range_is_inclusive() {
        let context = get_test_context();
        create_test_expense(&context, 10.0, "Food").await;

        let response = context
            .server
            .get("/api/expenses/date/2024-01-15/2024-01-15")
            .authorization_bearer(&context.token)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<ApiResponse<Vec<Expense>>>().count,
            Some(1)
        );

        let response = context
            .server
            .get("/api/expenses/date/2024-01-16/2024-01-31")
            .authorization_bearer(&context.token)
            .await;

        assert_eq!(
            response.json::<ApiResponse<Vec<Expense>>>().count,
            Some(0)
        );
    }

    #[tokio::test]
    async fn update_expense_merges_fields() {
        let context = get_test_context();
        let expense = create_test_expense(&context, 10.0, "Food").await;

        let response = context
            .server
            .put(&format_endpoint(endpoints::EXPENSE, expense.id))
            .authorization_bearer(&context.token)
            .json(&json!({ "amount": 12.5 }))
            .await;

        response.assert_status_ok();

        let updated = response.json::<ApiResponse<Expense>>().data.unwrap();
        assert_eq!(updated.amount, 12.5);
        assert_eq!(updated.description, expense.description);
        assert_eq!(updated.date, date!(2024 - 01 - 15));
    }

    #[tokio::test]
    async fn update_expense_of_other_user_is_unauthorized() {
        let context = get_test_context();
        let expense = create_test_expense(&context, 10.0, "Food").await;

        context
            .server
            .put(&format_endpoint(endpoints::EXPENSE, expense.id))
            .authorization_bearer(&context.other_token)
            .json(&json!({ "amount": 12.5 }))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn update_expense_rejects_invalid_merged_record() {
        let context = get_test_context();
        let expense = create_test_expense(&context, 10.0, "Food").await;

        context
            .server
            .put(&format_endpoint(endpoints::EXPENSE, expense.id))
            .authorization_bearer(&context.token)
            .json(&json!({ "amount": -3.0 }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn delete_expense_removes_it() {
        let context = get_test_context();
        let expense = create_test_expense(&context, 10.0, "Food").await;

        context
            .server
            .delete(&format_endpoint(endpoints::EXPENSE, expense.id))
            .authorization_bearer(&context.token)
            .await
            .assert_status_ok();

        context
            .server
            .get(&format_endpoint(endpoints::EXPENSE, expense.id))
            .authorization_bearer(&context.token)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_missing_expense_is_not_found() {
        let context = get_test_context();

        context
            .server
            .delete(&format_endpoint(endpoints::EXPENSE, 999))
            .authorization_bearer(&context.token)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn expenses_require_a_token() {
        let context = get_test_context();

        context
            .server
            .get(endpoints::EXPENSES)
            .await
            .assert_status_unauthorized();
    }
}
