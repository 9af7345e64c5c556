//! Crate-wide [`Error`] type, plus helper traits to attach context to lower-level errors.

use std::env;
use std::ffi::OsString;
use std::num::ParseIntError;

use diesel_async::pooled_connection::deadpool::PoolError;

use crate::auth::Role;
use crate::forward_from;

/// Shorthand for a [`Result`](core::result::Result) using our [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong in the Pokedex backend.
///
/// Variants wrapping an infrastructure error carry a [`Backtrace`](std::backtrace::Backtrace)
/// when the crate is built on a toolchain with `backtrace_support`. How each variant is reported
/// to API clients is decided in [`api::errors`](crate::api::errors).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required environment variable is missing or unusable.
    #[error("error related to environment variable: {context}")]
    EnvVar {
        /// What we were trying to load; see [`EnvVarContext`].
        context: String,

        #[allow(missing_docs)]
        source: EnvVarError,

        #[allow(missing_docs)]
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// A request body, path or query string could not be extracted.
    #[error("input parsing error")]
    Input {
        #[allow(missing_docs)]
        #[from]
        source: actix_web_validator::error::Error,

        #[allow(missing_docs)]
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// No database connection could be obtained from the pool.
    #[error("database connection error")]
    Pool {
        #[allow(missing_docs)]
        #[from]
        source: PoolError,

        #[allow(missing_docs)]
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// A storage operation failed, including when the requested row does not exist.
    #[error("query error: {context}")]
    Query {
        /// The operation that failed; see [`QueryContext`].
        context: String,

        #[allow(missing_docs)]
        source: diesel::result::Error,

        #[allow(missing_docs)]
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// Stored pokemon metadata could not be encoded or decoded.
    #[error("metadata codec error: {context}")]
    Metadata {
        /// Which metadata was being handled; see [`MetadataContext`].
        context: String,

        #[allow(missing_docs)]
        source: serde_json::Error,

        #[allow(missing_docs)]
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// A request was syntactically valid but its content was rejected (like an empty password).
    #[error("validation error: {message}")]
    Validation {
        /// What was wrong with the request.
        message: String,
    },

    /// Registration was attempted with a username that is already taken.
    #[error("username {username} is already taken")]
    DuplicateUsername {
        /// The username that was requested.
        username: String,
    },

    /// Login failed: unknown user or wrong password.
    #[error("username or password not valid")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("failed to hash password")]
    PasswordHash {
        #[allow(missing_docs)]
        source: argon2::password_hash::Error,
    },

    /// A session token could not be signed.
    #[error("failed to issue session token")]
    TokenIssue {
        #[allow(missing_docs)]
        source: jsonwebtoken::errors::Error,
    },

    /// The session token sent by the client is expired, tampered with or malformed.
    #[error("invalid session token")]
    InvalidSession {
        #[allow(missing_docs)]
        source: jsonwebtoken::errors::Error,
    },

    /// A protected endpoint was called without a session cookie.
    #[error("authentication required")]
    Unauthenticated,

    /// The caller's session role is below what the endpoint requires.
    #[error("role {required} required")]
    Forbidden {
        /// Minimum role needed to access the endpoint.
        required: Role,
    },

    /// Some application data was not registered with the web app.
    #[error("missing application data: {type_name}")]
    MissingAppData {
        /// Name of the type that could not be found.
        type_name: &'static str,
    },
}

impl Error {
    /// Returns `true` if this is a [`Query`](Error::Query) error caused by a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Query { source: diesel::result::Error::NotFound, .. })
    }
}

/// Reason why an environment variable could not be used.
///
/// Mirrors [`VarError`](env::VarError) and adds parsing failures.
#[derive(Debug, thiserror::Error)]
pub enum EnvVarError {
    /// The variable is not set.
    #[error("variable not found in environment")]
    NotFound,

    /// The variable is set but is not valid Unicode.
    #[error("variable contained invalid, non-Unicode characters")]
    NotUnicode(OsString),

    /// The variable should hold an integer but does not.
    #[error("expected int value, found {value}")]
    IntExpected {
        /// Raw content of the variable.
        value: String,

        #[allow(missing_docs)]
        source: ParseIntError,
    },
}

impl From<env::VarError> for EnvVarError {
    fn from(value: env::VarError) -> Self {
        match value {
            env::VarError::NotPresent => Self::NotFound,
            env::VarError::NotUnicode(raw) => Self::NotUnicode(raw),
        }
    }
}

/// Attaches context to an environment variable error, producing an [`EnvVar`](Error::EnvVar).
///
/// ```no_run
/// use std::env;
///
/// use pokedex::error::EnvVarContext;
///
/// # fn example() -> pokedex::Result<()> {
/// let secret = env::var("SESSION_SECRET").with_env_var_context(|| "SESSION_SECRET must be set")?;
/// # Ok(())
/// # }
/// ```
pub trait EnvVarContext {
    /// [`Error`] for a bare error, [`Result`] for a result.
    type Output;

    /// Wraps the error with the context returned by `context`, which is only called on error.
    fn with_env_var_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<E> EnvVarContext for E
where
    E: Into<EnvVarError>,
{
    type Output = Error;

    fn with_env_var_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        Error::EnvVar {
            context: context().into(),
            source: self.into(),
            #[cfg(backtrace_support)]
            backtrace: std::backtrace::Backtrace::capture(),
        }
    }
}

impl<T, E> EnvVarContext for core::result::Result<T, E>
where
    E: EnvVarContext<Output = Error>,
{
    type Output = Result<T>;

    fn with_env_var_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.with_env_var_context(context))
    }
}

forward_from!(diesel_async::pooled_connection::PoolError => PoolError => Error);

impl From<deadpool::managed::BuildError> for Error {
    /// Lets `?` be used when building the connection pool (see [`get_pool`](crate::db::get_pool)).
    ///
    /// # Panics
    ///
    /// If the pool was built without an async runtime, which is a build configuration mistake.
    fn from(value: deadpool::managed::BuildError) -> Self {
        match value {
            deadpool::managed::BuildError::NoRuntimeSpecified => {
                panic!("pool needs a runtime (check deadpool features in Cargo.toml): {}", value);
            },
        }
    }
}

/// Attaches context to a [`diesel`] error, producing a [`Query`](Error::Query).
///
/// ```no_run
/// use diesel::QueryDsl;
/// use diesel_async::RunQueryDsl;
/// use pokedex::error::QueryContext;
/// use pokedex::models::types::Type;
/// use pokedex::schema::types;
///
/// # async fn example(type_id: i64) -> pokedex::Result<()> {
/// # let pool = pokedex::db::get_pool()?;
/// # let mut connection = pool.get().await?;
/// let found: Type = types::table
///     .find(type_id)
///     .first(&mut connection)
///     .await
///     .with_query_context(|| format!("failed to fetch type {}", type_id))?;
/// # Ok(())
/// # }
/// ```
pub trait QueryContext {
    /// [`Error`] for a bare error, [`Result`] for a result.
    type Output;

    /// Wraps the error with the context returned by `context`, which is only called on error.
    fn with_query_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl QueryContext for diesel::result::Error {
    type Output = Error;

    fn with_query_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        Error::Query {
            context: context().into(),
            source: self,
            #[cfg(backtrace_support)]
            backtrace: std::backtrace::Backtrace::capture(),
        }
    }
}

impl<T, E> QueryContext for core::result::Result<T, E>
where
    E: QueryContext<Output = Error>,
{
    type Output = Result<T>;

    fn with_query_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.with_query_context(context))
    }
}

/// Attaches context to a metadata codec error, producing a [`Metadata`](Error::Metadata).
pub trait MetadataContext {
    /// [`Error`] for a bare error, [`Result`] for a result.
    type Output;

    /// Wraps the error with the context returned by `context`, which is only called on error.
    fn with_metadata_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl MetadataContext for serde_json::Error {
    type Output = Error;

    fn with_metadata_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        Error::Metadata {
            context: context().into(),
            source: self,
            #[cfg(backtrace_support)]
            backtrace: std::backtrace::Backtrace::capture(),
        }
    }
}

impl<T> MetadataContext for core::result::Result<T, serde_json::Error> {
    type Output = Result<T>;

    fn with_metadata_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.with_metadata_context(context))
    }
}
