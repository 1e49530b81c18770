//! Registration, sign-in, and bearer-token authentication.
//!
//! Protected handlers take a [Claims] argument, which axum fills in by
//! validating the `Authorization: Bearer <token>` header against the signing
//! secret. A handler that takes [Claims] can therefore only be reached with a
//! valid, unexpired token.

use std::str::FromStr;

use axum::{
    Json, RequestPartsExt,
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{Response, StatusCode, request::Parts},
    response::IntoResponse,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use email_address::EmailAddress;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    app_state::{AuthState, UserState},
    models::{NewUser, PasswordHash, UserID},
    response::ApiResponse,
    stores::UserStore,
};

// The JWT extractor is adapted from
// https://github.com/tokio-rs/axum/blob/main/examples/jwt/src/main.rs

/// How long an access token stays valid after it is issued.
const TOKEN_DURATION: Duration = Duration::minutes(15);

/// The contents of an access token.
#[derive(Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: i64,
    /// The expiry time of the token.
    pub exp: usize,
    /// The time the token was issued.
    pub iat: usize,
}

impl Claims {
    /// The ID of the user the token was issued to.
    pub fn user_id(&self) -> UserID {
        UserID::new(self.sub)
    }
}

impl<S> FromRequestParts<S> for Claims
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let auth_state = AuthState::from_ref(state);

        let token_data = decode_jwt(bearer.token(), &auth_state.decoding_key)?;

        Ok(token_data.claims)
    }
}

/// The data for a registration request.
#[derive(Deserialize)]
pub struct RegistrationData {
    /// Display name for the new account.
    pub name: String,
    /// Email for the new account.
    pub email: String,
    /// Password for the new account.
    pub password: String,
}

/// The data for a sign-in request.
#[derive(Deserialize)]
pub struct Credentials {
    /// Email entered during sign-in.
    pub email: String,
    /// Password entered during sign-in.
    pub password: String,
}

/// The errors that can occur while authenticating a request.
#[derive(Debug, PartialEq)]
pub enum AuthError {
    /// The email/password combination did not match a registered user.
    WrongCredentials,
    /// The request carried no bearer token.
    MissingToken,
    /// The bearer token was malformed, forged, or expired.
    InvalidToken,
    /// The token could not be signed.
    TokenCreation,
    /// Some other error occurred that the client should not see details of.
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response<Body> {
        let (status, error_message) = match self {
            AuthError::WrongCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Not authorized, no token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Not authorized, token failed"),
            AuthError::TokenCreation => (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(ApiResponse::<()>::error(error_message.to_string()));

        (status, body).into_response()
    }
}

/// The response to a successful sign-in: a signed access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed access token to present in the `Authorization` header.
    pub token: String,
}

/// A user as reported to clients, that is, without the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// The user's ID.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: EmailAddress,
}

/// Handler for registration requests.
///
/// # Errors
///
/// Returns a 400 response if the name or password is empty, the email is
/// malformed, or the email already belongs to a user.
pub async fn register<U>(
    State(mut state): State<UserState<U>>,
    Json(registration): Json<RegistrationData>,
) -> Result<impl IntoResponse, Error>
where
    U: UserStore + Send + Sync,
{
    let email = EmailAddress::from_str(&registration.email)
        .map_err(|_| Error::InvalidEmail(registration.email.clone()))?;

    // The unique index on email would catch this anyway, this check just
    // avoids hashing the password for a doomed request.
    if state.user_store.get_by_email(&email).is_ok() {
        return Err(Error::DuplicateEmail);
    }

    let password_hash =
        PasswordHash::from_raw_password(&registration.password, PasswordHash::DEFAULT_COST)?;

    state
        .user_store
        .create(NewUser::new(&registration.name, email, password_hash)?)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::<()>::message(
            "User registered successfully".to_string(),
        )),
    ))
}

/// Handler for sign-in requests.
///
/// # Errors
///
/// This function will return a 401 response when:
/// - the email does not belong to a registered user,
/// - or the password is not correct.
///
/// The two cases are deliberately indistinguishable to the client.
pub async fn sign_in<U>(
    State(state): State<UserState<U>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<ApiResponse<TokenResponse>>, AuthError>
where
    U: UserStore + Send + Sync,
{
    let email =
        EmailAddress::from_str(&credentials.email).map_err(|_| AuthError::WrongCredentials)?;

    let user = state.user_store.get_by_email(&email).map_err(|e| match e {
        Error::NotFound => AuthError::WrongCredentials,
        error => {
            tracing::error!("Error matching user: {error:?}");
            AuthError::InternalError
        }
    })?;

    let password_is_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|e| {
            tracing::error!("Error verifying password: {e}");
            AuthError::InternalError
        })?;

    if !password_is_correct {
        return Err(AuthError::WrongCredentials);
    }

    let token = encode_jwt(user.id, &state.encoding_key)?;

    Ok(Json(ApiResponse::data(TokenResponse { token })))
}

/// Handler that describes the signed-in user.
///
/// # Errors
///
/// Returns a 404 response if the user the token was issued to no longer
/// exists.
pub async fn get_me<U>(
    claims: Claims,
    State(state): State<UserState<U>>,
) -> Result<Json<ApiResponse<UserResponse>>, Error>
where
    U: UserStore + Send + Sync,
{
    let user = state.user_store.get(claims.user_id())?;

    Ok(Json(ApiResponse::data(UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    })))
}

pub(crate) fn encode_jwt(
    user_id: UserID,
    encoding_key: &EncodingKey,
) -> Result<String, AuthError> {
    let now = OffsetDateTime::now_utc();
    let exp = (now + TOKEN_DURATION).unix_timestamp() as usize;
    let iat = now.unix_timestamp() as usize;
    let claims = Claims {
        sub: user_id.as_i64(),
        exp,
        iat,
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|e| {
        tracing::error!("Error signing token: {e}");
        AuthError::TokenCreation
    })
}

fn decode_jwt(jwt_token: &str, decoding_key: &DecodingKey) -> Result<TokenData<Claims>, AuthError> {
    decode(jwt_token, decoding_key, &Validation::default()).map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod auth_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use email_address::EmailAddress;
    use jsonwebtoken::{DecodingKey, EncodingKey};
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        ApiResponse, AppState, TableRenderer, auth,
        auth::TokenResponse,
        db::initialize,
        models::{NewUser, PasswordHash, User, UserID},
        stores::{
            UserStore,
            sqlite::{SQLiteBudgetStore, SQLiteExpenseStore, SQLiteGoalStore, SQLiteUserStore},
        },
    };

    type TestAppState =
        AppState<SQLiteUserStore, SQLiteExpenseStore, SQLiteBudgetStore, SQLiteGoalStore>;

    fn get_test_state() -> TestAppState {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");
        let connection = Arc::new(Mutex::new(connection));

        AppState::new(
            "foobar",
            SQLiteUserStore::new(connection.clone()),
            SQLiteExpenseStore::new(connection.clone()),
            SQLiteBudgetStore::new(connection.clone()),
            SQLiteGoalStore::new(connection),
            Arc::new(TableRenderer),
        )
    }

    fn insert_test_user(state: &mut TestAppState, raw_password: &str) -> User {
        state
            .user_store
            .create(
                NewUser::new(
                    "Jo",
                    EmailAddress::from_str("foo@bar.baz").unwrap(),
                    PasswordHash::from_raw_password(raw_password, 4).unwrap(),
                )
                .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn jwt_round_trip_gives_back_user_id() {
        let encoding_key = EncodingKey::from_secret("foobar".as_bytes());
        let decoding_key = DecodingKey::from_secret("foobar".as_bytes());

        let jwt = auth::encode_jwt(UserID::new(42), &encoding_key).unwrap();
        let claims = auth::decode_jwt(&jwt, &decoding_key).unwrap().claims;

        assert_eq!(claims.user_id(), UserID::new(42));
    }

    #[tokio::test]
    async fn register_creates_a_user() {
        let state = get_test_state();
        let user_store = state.user_store.clone();

        let app = Router::new()
            .route("/register", post(auth::register))
            .with_state(state);
        let server = TestServer::new(app);

        server
            .post("/register")
            .json(&json!({
                "name": "Jo",
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let user = user_store
            .get_by_email(&EmailAddress::from_str("foo@bar.baz").unwrap())
            .unwrap();

        assert_eq!(user.name, "Jo");
    }

    #[tokio::test]
    async fn register_fails_with_duplicate_email() {
        let mut state = get_test_state();
        insert_test_user(&mut state, "averysafeandsecurepassword");

        let app = Router::new()
            .route("/register", post(auth::register))
            .with_state(state);
        let server = TestServer::new(app);

        server
            .post("/register")
            .json(&json!({
                "name": "Jo",
                "email": "foo@bar.baz",
                "password": "anotherpassword",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_fails_with_invalid_email() {
        let app = Router::new()
            .route("/register", post(auth::register))
            .with_state(get_test_state());
        let server = TestServer::new(app);

        server
            .post("/register")
            .json(&json!({
                "name": "Jo",
                "email": "not an email",
                "password": "averysafeandsecurepassword",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sign_in_succeeds_with_valid_credentials() {
        let mut state = get_test_state();
        insert_test_user(&mut state, "averysafeandsecurepassword");

        let app = Router::new()
            .route("/sign_in", post(auth::sign_in))
            .with_state(state);
        let server = TestServer::new(app);

        server
            .post("/sign_in")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
            }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn sign_in_fails_with_wrong_password() {
        let mut state = get_test_state();
        insert_test_user(&mut state, "averysafeandsecurepassword");

        let app = Router::new()
            .route("/sign_in", post(auth::sign_in))
            .with_state(state);
        let server = TestServer::new(app);

        server
            .post("/sign_in")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn sign_in_fails_with_unknown_email() {
        let app = Router::new()
            .route("/sign_in", post(auth::sign_in))
            .with_state(get_test_state());
        let server = TestServer::new(app);

        server
            .post("/sign_in")
            .json(&json!({
                "email": "wrongemail@gmail.com",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_me_returns_user_without_password_hash() {
        let mut state = get_test_state();
        let user = insert_test_user(&mut state, "averysafeandsecurepassword");

        let app = Router::new()
            .route("/sign_in", post(auth::sign_in))
            .route("/me", get(auth::get_me))
            .with_state(state);
        let server = TestServer::new(app);

        let response = server
            .post("/sign_in")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
            }))
            .await;

        response.assert_status_ok();

        let token = response.json::<ApiResponse<TokenResponse>>().data.unwrap();

        let response = server.get("/me").authorization_bearer(token.token).await;

        response.assert_status_ok();

        let body = response.text();
        assert!(body.contains("foo@bar.baz"));
        assert!(!body.contains("password"));

        let me = response
            .json::<ApiResponse<auth::UserResponse>>()
            .data
            .unwrap();
        assert_eq!(me.id, user.id);
    }

    #[tokio::test]
    async fn protected_route_fails_with_missing_header() {
        let app = Router::new()
            .route("/me", get(auth::get_me))
            .with_state(get_test_state());
        let server = TestServer::new(app);

        server
            .get("/me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_fails_with_garbage_token() {
        let app = Router::new()
            .route("/me", get(auth::get_me))
            .with_state(get_test_state());
        let server = TestServer::new(app);

        server
            .get("/me")
            .authorization_bearer("not.a.token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_fails_with_token_signed_by_other_key() {
        let forged = auth::encode_jwt(
            UserID::new(1),
            &EncodingKey::from_secret("someotherkey".as_bytes()),
        )
        .unwrap();

        let app = Router::new()
            .route("/me", get(auth::get_me))
            .with_state(get_test_state());
        let server = TestServer::new(app);

        server
            .get("/me")
            .authorization_bearer(forged)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
