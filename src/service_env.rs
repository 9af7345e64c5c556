//! Runtime environment of the Pokedex service, read from `POKEDEX_ENV`.

// strum's `EnumIs` generates undocumented methods
#![allow(missing_docs)]

use std::env;
use std::sync::{OnceLock, PoisonError, RwLock};

use strum_macros::{AsRefStr, Display, EnumIs, EnumString};

/// Name of the environment variable selecting the [`ServiceEnv`].
pub const SERVICE_ENV_VAR: &str = "POKEDEX_ENV";

/// Environment the service runs in. Decides how much of an internal error leaks into responses.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, AsRefStr, Display, EnumIs, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ServiceEnv {
    /// Error responses carry the full error chain, and the backtrace when captured.
    Development,

    /// Error responses carry a status and a generic message only.
    #[default]
    Production,
}

/// Set while a unit test simulates an environment (see [`ServiceEnv::test`]).
static SIMULATED_ENV: RwLock<Option<ServiceEnv>> = RwLock::new(None);

impl ServiceEnv {
    /// Returns the environment the service runs in.
    ///
    /// `POKEDEX_ENV` is read once, on first call; unset or unknown values mean
    /// [`Production`](ServiceEnv::Production).
    ///
    /// ```no_run
    /// use pokedex::service_env::ServiceEnv;
    ///
    /// if ServiceEnv::current().is_development() {
    ///     log::warn!("Internal errors will be sent to clients");
    /// }
    /// ```
    pub fn current() -> Self {
        static FROM_ENV: OnceLock<ServiceEnv> = OnceLock::new();

        let simulated = *SIMULATED_ENV.read().unwrap_or_else(PoisonError::into_inner);
        simulated.unwrap_or_else(|| *FROM_ENV.get_or_init(ServiceEnv::from_env))
    }

    /// Parses `POKEDEX_ENV` now, bypassing the value cached by [`current`](ServiceEnv::current).
    pub fn from_env() -> Self {
        env::var(SERVICE_ENV_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Runs `f` while [`current`](ServiceEnv::current) returns `env`.
    #[cfg(test)]
    pub async fn test<F>(env: ServiceEnv, f: F)
    where
        F: std::future::Future<Output = ()>,
    {
        let previous = SIMULATED_ENV.write().unwrap().replace(env);

        f.await;

        *SIMULATED_ENV.write().unwrap() = previous;
    }
}
