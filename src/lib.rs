//! Library crate of the Pokedex REST backend.
//!
//! Contains all the actual implementation: storage accessors, services, session handling and the
//! REST API endpoints. The `pokedex` binary only wires these together and starts the HTTP server.
//!
//! For more information, see `README.md`.

#![cfg_attr(backtrace_support, feature(error_generic_member_access))]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod db;
pub mod error;
pub mod helpers;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod service_env;
pub mod services;

use actix_web::web::{Data, ServiceConfig};
use actix_web_validator::{JsonConfig, PathConfig, QueryConfig};
pub use error::Error;
pub use error::Result;
use log::trace;

use crate::api::errors::actix_error_handler;
use crate::auth::session::SessionKeys;
use crate::repositories::Repositories;

/// State shared by every worker of the Pokedex web app.
#[derive(Clone)]
pub struct AppState {
    /// Storage accessors used by the services
    pub repositories: Repositories,

    /// Keys used to issue and verify session tokens
    pub session_keys: SessionKeys,
}

impl AppState {
    /// Creates the app state from its parts.
    pub fn new(repositories: Repositories, session_keys: SessionKeys) -> Self {
        Self { repositories, session_keys }
    }
}

/// Configures the Pokedex REST API.
///
/// Registers the services as app data, sets up error handlers for extractors so that their errors
/// are reported as [`ErrorResponse`](api::errors::ErrorResponse)s, then adds all API endpoints
/// and OpenAPI documentation endpoints.
///
/// Usually called through [`pokedex_app!`].
pub fn configure_api(state: &AppState) -> impl FnOnce(&mut ServiceConfig) + '_ {
    |config| {
        trace!("Registering services app data");
        config
            .app_data(Data::new(services::pokemon::Service::new(&state.repositories)))
            .app_data(Data::new(services::types::Service::new(&state.repositories)))
            .app_data(Data::new(services::user::Service::new(
                &state.repositories,
                state.session_keys.clone(),
            )))
            .app_data(Data::new(state.session_keys.clone()));

        trace!("Registering extractor error handlers");
        config
            .app_data(JsonConfig::default().error_handler(actix_error_handler))
            .app_data(PathConfig::default().error_handler(actix_error_handler))
            .app_data(QueryConfig::default().error_handler(actix_error_handler));

        config.configure(api::configure).configure(api::doc::configure);
    }
}

/// Creates an [`App`](actix_web::App) serving the Pokedex REST API for the given [`AppState`].
///
/// # Examples
///
/// ```no_run
/// use actix_web::HttpServer;
/// use pokedex::auth::session::SessionKeys;
/// use pokedex::db::get_pool;
/// use pokedex::repositories::Repositories;
/// use pokedex::{pokedex_app, AppState};
///
/// # async fn start() -> anyhow::Result<()> {
/// let state = AppState::new(Repositories::postgres(get_pool()?), SessionKeys::from_env()?);
/// HttpServer::new(move || pokedex_app!(state))
///     .bind(("127.0.0.1", 8080))?
///     .run()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! pokedex_app {
    ($state:expr) => {
        ::actix_web::App::new()
            .wrap(::actix_web::middleware::Logger::default())
            .configure($crate::configure_api(&$state))
    };
}
