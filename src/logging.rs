//! Middleware for logging requests and responses.

use axum::{
    extract::Request,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Password fields in JSON
/// request bodies are redacted before logging. Responses without a textual
/// content type only have their status and headers logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    if headers
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
    {
        let display_text = redact_json_string_field(&body_text, "password");
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    // Binary bodies such as PDF downloads must pass through untouched, so
    // they are never converted to text.
    if !has_textual_body(response.headers()) {
        tracing::info!(
            "Sending response: {} {:#?}\nbody: <not logged: non-text content type>",
            response.status(),
            response.headers()
        );
        return response;
    }

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

/// Whether a response body is safe to round-trip through a `String`.
fn has_textual_body(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json") || value.starts_with("text/"))
}

/// Replace the string value of `field_name` in a JSON object with asterisks.
///
/// Works on the raw body text rather than a parsed document so that invalid
/// JSON still gets logged (unredacted fields and all).
fn redact_json_string_field(body_text: &str, field_name: &str) -> String {
    let field_start = match body_text.find(&format!("\"{field_name}\"")) {
        Some(position) => position,
        None => return body_text.to_string(),
    };

    let after_field = &body_text[field_start..];

    let value_start = match after_field
        .find(':')
        .and_then(|colon| after_field[colon..].find('"').map(|quote| colon + quote + 1))
    {
        Some(position) => field_start + position,
        None => return body_text.to_string(),
    };

    let mut value_end = value_start;
    let bytes = body_text.as_bytes();

    while value_end < bytes.len() {
        match bytes[value_end] {
            b'\\' => value_end += 2,
            b'"' => break,
            _ => value_end += 1,
        }
    }

    format!(
        "{}********{}",
        &body_text[..value_start],
        &body_text[value_end.min(bytes.len())..]
    )
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Cut `body` at `limit` bytes, backing up so the cut never lands inside a
/// multi-byte character.
fn truncate_on_char_boundary(body: &str, limit: usize) -> &str {
    let mut end = limit.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate_on_char_boundary(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate_on_char_boundary(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}


#[cfg(test)]
mod truncation_tests {
    use super::{LOG_BODY_LENGTH_LIMIT, truncate_on_char_boundary};

    #[test]
    fn cuts_ascii_at_the_limit() {
        let body = "a".repeat(100);

        let truncated = truncate_on_char_boundary(&body, LOG_BODY_LENGTH_LIMIT);

        assert_eq!(truncated.len(), LOG_BODY_LENGTH_LIMIT);
    }

    #[test]
    fn backs_up_when_the_limit_splits_a_character() {
        // "é" is two bytes, so the limit lands in the middle of it.
        let body = "a".repeat(LOG_BODY_LENGTH_LIMIT - 1) + "ééé";

        let truncated = truncate_on_char_boundary(&body, LOG_BODY_LENGTH_LIMIT);

        assert_eq!(truncated.len(), LOG_BODY_LENGTH_LIMIT - 1);
        assert!(truncated.chars().all(|character| character == 'a'));
    }

    #[test]
    fn leaves_short_bodies_whole() {
        let truncated = truncate_on_char_boundary("short", LOG_BODY_LENGTH_LIMIT);

        assert_eq!(truncated, "short");
    }
}

#[cfg(test)]
mod middleware_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::middleware;
    use axum_test::TestServer;
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        AppState, TableRenderer,
        auth::encode_jwt,
        build_router,
        db::initialize,
        endpoints,
        models::{NewUser, PasswordHash},
        stores::{
            UserStore,
            sqlite::{SQLiteBudgetStore, SQLiteExpenseStore, SQLiteGoalStore, SQLiteUserStore},
        },
    };

    use super::logging_middleware;

    /// A test server with the logging middleware applied, as the production
    /// router is wired.
    fn get_logged_test_server() -> (TestServer, String) {
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

        let state = AppState::new(
            "foobar",
            user_store,
            SQLiteExpenseStore::new(connection.clone()),
            SQLiteBudgetStore::new(connection.clone()),
            SQLiteGoalStore::new(connection),
            Arc::new(TableRenderer),
        );

        let token = encode_jwt(user.id, &state.encoding_key).unwrap();
        let router = build_router(state).layer(middleware::from_fn(logging_middleware));

        (TestServer::new(router), token)
    }

    #[tokio::test]
    async fn pdf_download_passes_through_unmangled() {
        let (server, token) = get_logged_test_server();

        server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .json(&json!({
                "amount": 30.0,
                "description": "test expense",
                "category": "Food",
                "date": "2024-01-15",
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get(endpoints::REPORT_EXPENSES_PDF)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let body = response.as_bytes();
        assert!(body.starts_with(b"%PDF"));
        // The UTF-8 replacement character would mean the binary body was
        // converted to text somewhere along the way.
        assert!(
            !body.windows(3).any(|window| window == [0xEF, 0xBF, 0xBD]),
            "PDF body contains UTF-8 replacement characters"
        );
    }

    #[tokio::test]
    async fn json_responses_still_flow_through_the_body_log() {
        let (server, token) = get_logged_test_server();

        let response = server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("\"success\":true"));
    }
}
