//! Helpers to read configuration from environment variables and the `.env` file.

use std::env;
use std::num::ParseIntError;
use std::str::FromStr;

use dotenvy::dotenv;

use crate::error::{EnvVarContext, EnvVarError};

/// Loads the `.env` file through [`dotenv`] if there is one.
///
/// Returns `Ok(false)` when no `.env` file exists; a file that exists but cannot be parsed is
/// an error.
pub fn load_optional_dotenv() -> dotenvy::Result<bool> {
    match dotenv() {
        Ok(_) => Ok(true),
        Err(err) if err.not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Reads an environment variable that must hold an integer.
///
/// | Environment variable     | Return value                    |
/// |--------------------------|---------------------------------|
/// | Contains value `42`      | `Ok(42)`                        |
/// | Does not exist           | `Err(EnvVarError::NotFound)`    |
/// | Contains invalid unicode | `Err(EnvVarError::NotUnicode)`  |
/// | Contains value `foo`     | `Err(EnvVarError::IntExpected)` |
pub fn int_env_var<T>(key: &str) -> Result<T, EnvVarError>
where
    T: FromStr<Err = ParseIntError>,
{
    let value = env::var(key)?;

    value
        .parse()
        .map_err(|source| EnvVarError::IntExpected { value, source })
}

/// Reads an optional environment variable.
///
/// `Ok(None)` if it is not set; invalid Unicode is an [`EnvVar`](crate::Error::EnvVar) error.
pub fn optional_env_var(key: &str) -> crate::Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.with_env_var_context(|| format!("failed to read {}", key))),
    }
}

/// Reads an optional int environment variable.
///
/// Returns `Ok(None)` when the variable is not set; any other problem (invalid Unicode, not an
/// int) is reported as an [`EnvVar`](crate::Error::EnvVar) error mentioning the variable name.
pub fn optional_int_env_var<T>(key: &str) -> crate::Result<Option<T>>
where
    T: FromStr<Err = ParseIntError>,
{
    match int_env_var(key) {
        Ok(value) => Ok(Some(value)),
        Err(EnvVarError::NotFound) => Ok(None),
        Err(err) => {
            Err(err.with_env_var_context(|| format!("failed to parse environment variable {}", key)))
        },
    }
}
