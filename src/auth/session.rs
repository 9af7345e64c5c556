//! Signed session tokens, carried by the client in the [`SESSION_COOKIE`] cookie.

use std::env;
use std::fmt;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::auth::Role;
use crate::error::EnvVarContext;
use crate::helpers::env::optional_int_env_var;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "token";

/// Lifetime of a session token unless `SESSION_TTL_SECONDS` says otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(1);

/// Content of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Name of the logged-in user
    pub username: String,

    /// Email of the logged-in user
    pub email: String,

    /// Role of the logged-in user
    pub role: Role,

    /// Issue time, as a Unix timestamp
    pub iat: i64,

    /// Expiry time, as a Unix timestamp
    pub exp: i64,
}

/// Keys used to sign and verify session tokens (HS256), along with the token lifetime.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    /// Creates keys from a shared secret, with the [default lifetime](DEFAULT_SESSION_TTL).
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Changes the lifetime of the tokens issued by these keys.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Loads the keys from the environment.
    ///
    /// `SESSION_SECRET` is required; `SESSION_TTL_SECONDS` is optional.
    pub fn from_env() -> crate::Result<Self> {
        let secret = env::var("SESSION_SECRET")
            .with_env_var_context(|| "SESSION_SECRET environment variable must be set")?;
        let keys = Self::new(secret.as_bytes());

        Ok(match optional_int_env_var::<i64>("SESSION_TTL_SECONDS")? {
            Some(seconds) => keys.with_ttl(Duration::seconds(seconds)),
            None => keys,
        })
    }

    /// Lifetime of the tokens issued by these keys.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for the given user, valid from now.
    pub fn issue(&self, username: &str, email: &str, role: Role) -> crate::Result<String> {
        self.issue_at(username, email, role, OffsetDateTime::now_utc())
    }

    /// Issues a token as if it had been created at `issued_at`.
    pub fn issue_at(
        &self,
        username: &str,
        email: &str,
        role: Role,
        issued_at: OffsetDateTime,
    ) -> crate::Result<String> {
        let claims = Claims {
            username: username.into(),
            email: email.into(),
            role,
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + self.ttl).unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|source| crate::Error::TokenIssue { source })
    }

    /// Checks a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> crate::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|source| crate::Error::InvalidSession { source })
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
