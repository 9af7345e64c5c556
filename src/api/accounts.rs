//! Account endpoints: registration and session management.
//!
//! # Endpoints
//!
//! | HTTP method | Endpoint    | Usage                                                  | See          |
//! |-------------|-------------|--------------------------------------------------------|--------------|
//! | `POST`      | `/register` | Creates a new account                                  | [`register`] |
//! | `POST`      | `/login`    | Checks credentials and sets the session cookie         | [`login`]    |
//! | `POST`      | `/logout`   | Removes the session cookie                             | [`logout`]   |

use actix_web::cookie::{Cookie, SameSite};
use actix_web::web::{Data, ServiceConfig};
use actix_web::{post, HttpResponse};
use actix_web_validator::Json;
use log::{info, trace};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::doc::ServerErrorResponse;
use crate::api::HttpResult;
use crate::auth::session::SESSION_COOKIE;
use crate::models::user::{LoginRequest, RegisterRequest};
use crate::services::user;
use crate::Error;

/// Registers the account endpoints.
pub fn configure(config: &mut ServiceConfig) {
    trace!("Adding account endpoints");
    config.service(register).service(login).service(logout);
}

/// Simple message returned by the session endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// What happened
    pub message: String,
}

impl MessageResponse {
    fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

/// Creates a new account
#[utoipa::path(
    request_body(content = RegisterRequest, description = "New account information"),
    responses(
        (status = CREATED, body = crate::models::user::RegisteredUser),
        (status = BAD_REQUEST, description = "Missing username or password"),
        (status = CONFLICT, description = "Username already taken"),
        ServerErrorResponse,
    ),
)]
#[post("/register")]
pub async fn register(request: Json<RegisterRequest>, service: Data<user::Service>) -> HttpResult {
    let registered = service.get_ref().register(&request).await?;

    Ok(HttpResponse::Created().json(registered))
}

#[cfg_attr(
    doc,
    doc = r"
        Logs a user in.

        Registered as `POST /login`. On success, the session token is returned in the `token`
        cookie (HTTP-only, valid for the whole site) and expires after the session lifetime.
        Unknown users and wrong passwords are both reported as `401 Unauthorized`.
    "
)]
#[cfg_attr(not(doc), doc = "Logs a user in and sets the session cookie")]
#[utoipa::path(
    request_body(content = LoginRequest, description = "Credentials"),
    responses(
        (status = OK, body = MessageResponse, description = "Session cookie set"),
        (status = BAD_REQUEST, description = "Missing username or password"),
        (status = UNAUTHORIZED, description = "Invalid username or password"),
        ServerErrorResponse,
    ),
)]
#[post("/login")]
pub async fn login(request: Json<LoginRequest>, service: Data<user::Service>) -> HttpResult {
    let token = service
        .get_ref()
        .login(&request)
        .await
        .map_err(|error| if error.is_not_found() { Error::InvalidCredentials } else { error })?;
    info!("User {} logged in", request.username);

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(service.get_ref().session_keys().ttl())
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(MessageResponse::new("logged in")))
}

/// Logs the current user out by removing the session cookie
#[utoipa::path(
    responses(
        (status = OK, body = MessageResponse, description = "Session cookie removed"),
    ),
)]
#[post("/logout")]
pub async fn logout() -> HttpResult {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(MessageResponse::new("logged out")))
}
