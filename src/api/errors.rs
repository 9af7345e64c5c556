//! Mapping of [`Error`]s to HTTP error responses.
//!
//! | Error                                                         | Status                      |
//! |---------------------------------------------------------------|-----------------------------|
//! | [`Input`], [`Validation`]                                     | `400 Bad Request`           |
//! | [`InvalidCredentials`], [`Unauthenticated`], [`InvalidSession`] | `401 Unauthorized`        |
//! | [`Forbidden`]                                                 | `403 Forbidden`             |
//! | [`Query`] caused by a missing row                             | `404 Not Found`             |
//! | [`DuplicateUsername`]                                         | `409 Conflict`              |
//! | [`Query`] caused by a unique or check constraint              | `400 Bad Request`           |
//! | anything else                                                 | `500 Internal Server Error` |
//!
//! [`Input`]: Error::Input
//! [`Validation`]: Error::Validation
//! [`InvalidCredentials`]: Error::InvalidCredentials
//! [`Unauthenticated`]: Error::Unauthenticated
//! [`InvalidSession`]: Error::InvalidSession
//! [`Forbidden`]: Error::Forbidden
//! [`Query`]: Error::Query
//! [`DuplicateUsername`]: Error::DuplicateUsername

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TryFromInto};
use utoipa::{ToResponse, ToSchema};

use crate::helpers::error::describe_error_chain;
use crate::service_env::ServiceEnv;
use crate::Error;

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Input { .. } | Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthenticated | Error::InvalidSession { .. } => {
                StatusCode::UNAUTHORIZED
            },
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::DuplicateUsername { .. } => StatusCode::CONFLICT,
            Error::Query { source, .. } => {
                status_code_for_query_error(source).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            },
            Error::EnvVar { .. }
            | Error::Pool { .. }
            | Error::Metadata { .. }
            | Error::PasswordHash { .. }
            | Error::TokenIssue { .. }
            | Error::MissingAppData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let body = ErrorResponse::from(self);
        HttpResponse::build(body.status_code).json(body)
    }
}

/// Returns the status to use for a storage error caused by the request, or `None` if the
/// storage itself failed.
pub fn status_code_for_query_error(error: &diesel::result::Error) -> Option<StatusCode> {
    match error {
        diesel::result::Error::NotFound => Some(StatusCode::NOT_FOUND),
        diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::CheckViolation,
            _,
        ) => Some(StatusCode::BAD_REQUEST),
        _ => None,
    }
}

/// Body of every error response of the Pokedex API.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, ToResponse)]
#[response(
    description = "Error",
    example = json!({
        "status_code": 404,
        "error": "Not Found"
    }),
)]
pub struct ErrorResponse {
    /// HTTP status code
    #[serde_as(as = "TryFromInto<u16>")]
    #[schema(value_type = u16, minimum = 100, maximum = 999)]
    pub status_code: StatusCode,

    /// Canonical reason of the status code
    pub error: String,

    /// What the caller did wrong, for errors caused by the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Full internal error chain; only sent when `POKEDEX_ENV` is `development`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_error: Option<String>,
}

impl From<&Error> for ErrorResponse {
    /// ```
    /// use actix_web::http::StatusCode;
    /// use pokedex::api::errors::ErrorResponse;
    /// use pokedex::Error;
    ///
    /// let response = ErrorResponse::from(&Error::DuplicateUsername { username: "ash".into() });
    ///
    /// assert_eq!(StatusCode::CONFLICT, response.status_code);
    /// assert_eq!(Some("username ash is already taken".into()), response.details);
    /// ```
    fn from(error: &Error) -> Self {
        let status_code = error.status_code();

        Self {
            status_code,
            error: status_code
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .into(),
            details: details(error),
            internal_error: ServiceEnv::current()
                .is_development()
                .then(|| describe_error_chain(error)),
        }
    }
}

fn details(error: &Error) -> Option<String> {
    match error {
        Error::Input { source, .. } => Some(source.to_string()),
        Error::Validation { .. } | Error::DuplicateUsername { .. } | Error::Forbidden { .. } => {
            Some(error.to_string())
        },
        _ => None,
    }
}

/// Error handler for the [`actix_web_validator`] extractor configs.
///
/// Turns extractor errors into our [`Error`], so that a malformed body, path or query is
/// reported with the same [`ErrorResponse`] as errors returned by the endpoints.
///
/// ```no_run
/// use actix_web_validator::QueryConfig;
/// use pokedex::api::errors::actix_error_handler;
///
/// let query_config = QueryConfig::default().error_handler(actix_error_handler);
/// ```
pub fn actix_error_handler<E, R>(err: E, _req: &R) -> actix_web::error::Error
where
    E: Into<Error>,
{
    Into::<Error>::into(err).into()
}
