//! Fintrack is a personal-finance record-keeping backend.
//!
//! Authenticated users create and query expenses, budgets, and savings goals,
//! and derive aggregate reports (category summaries, budget-vs-actual, goal
//! progress, PDF/CSV exports). Every resource is scoped to its owning user.
//!
//! This library provides a JSON REST API; the `server` binary wires it to a
//! SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
pub mod auth;
mod budget;
mod db;
mod endpoints;
mod expense;
mod goal;
mod logging;
pub mod models;
mod render;
mod report;
mod response;
mod routing;
pub mod stores;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use render::{DocumentRenderer, TableRenderer};
pub use response::ApiResponse;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email/password combination that does not match a
    /// registered user.
    ///
    /// The error message is deliberately the same whether the email is
    /// unknown or the password is wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The email used for registration already belongs to a user.
    #[error("the email is already registered")]
    DuplicateEmail,

    /// A required text field was missing or empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// An amount that must be strictly positive was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveAmount(&'static str),

    /// An amount that must not be negative was negative.
    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),

    /// A string could not be parsed as one of the supported expense
    /// categories.
    #[error("\"{0}\" is not a recognised category")]
    InvalidCategory(String),

    /// A string could not be parsed as an email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A string could not be parsed as a recurring interval.
    #[error("\"{0}\" is not a recognised recurring interval")]
    InvalidRecurringInterval(String),

    /// A string could not be parsed as a budget period.
    #[error("\"{0}\" is not a recognised budget period")]
    InvalidPeriod(String),

    /// The requested resource was not found.
    ///
    /// This is also returned when a resource exists but is owned by a
    /// different user, so that callers cannot probe for other users' records.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The resource exists but is owned by a different user.
    ///
    /// Only produced on update/delete paths, which load the record before
    /// comparing ownership.
    #[error("not authorized to modify this resource")]
    Forbidden,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server,
    /// never sent to the client.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The document renderer failed to produce a PDF or CSV.
    #[error("could not render document: {0}")]
    RenderError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::InvalidCredentials | Error::Forbidden => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::DuplicateEmail
            | Error::EmptyField(_)
            | Error::NonPositiveAmount(_)
            | Error::NegativeAmount(_)
            | Error::InvalidEmail(_)
            | Error::InvalidCategory(_)
            | Error::InvalidRecurringInterval(_)
            | Error::InvalidPeriod(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // Anything else is an internal error whose details must not be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
