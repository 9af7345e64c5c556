//! Types and functions used to implement the Pokedex REST API.
//!
//! # Scopes
//!
//! | Scope                | Access                                 | See                             |
//! |----------------------|----------------------------------------|---------------------------------|
//! | `/`                  | Anyone (health check, accounts)        | [`accounts`], [`healthz`]       |
//! | `/pokedex`           | Anyone (read-only catalogue)           | [`pokemons`], [`types`]         |
//! | `/user/pokedex`      | Logged-in users with role `user`+      | [`pokemons::catch`]             |
//! | `/internal/pokedex`  | Logged-in users with role `admin`      | [`pokemons`], [`types`]         |

pub mod accounts;
pub mod doc;
pub mod errors;
pub mod pokemons;
pub mod session;
pub mod types;

use actix_web::http::header::ContentType;
use actix_web::middleware::from_fn;
use actix_web::web::ServiceConfig;
use actix_web::{get, web, HttpResponse, Responder};
use log::trace;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::session::{require_admin, require_user};

/// [`Result`](crate::Result) definition used to return [`HttpResponse`]s from API endpoints.
///
/// If an [`Error`](crate::Error) is returned, it is converted to an appropriate [`HttpResponse`]
/// by the error handling code (see [`ErrorResponse::from`](errors::ErrorResponse::from) for details).
pub type HttpResult = crate::Result<HttpResponse>;

/// Path parameter used for endpoints working on one entity.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Validate, utoipa::IntoParams)]
pub struct Id {
    /// id of the entity in database
    #[validate(range(min = 1))]
    #[param(minimum = 1)]
    pub id: i64,
}

impl std::ops::Deref for Id {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.id
    }
}

/// Registers all Pokedex API endpoints.
///
/// Called automatically from [`configure_api`](crate::configure_api).
pub fn configure(config: &mut ServiceConfig) {
    trace!("Adding API endpoints");
    config
        .service(healthz)
        .configure(accounts::configure)
        .service(
            web::scope("/pokedex")
                .configure(pokemons::configure_public)
                .configure(types::configure_public),
        )
        .service(
            web::scope("/user/pokedex")
                .wrap(from_fn(require_user))
                .configure(pokemons::configure_user),
        )
        .service(
            web::scope("/internal/pokedex")
                .wrap(from_fn(require_admin))
                .configure(pokemons::configure_internal)
                .configure(types::configure_internal),
        );
}

/// Health check endpoint. Always answers `ok`.
#[utoipa::path(responses((status = OK, description = "Service is up", body = String)))]
#[get("/healthz")]
pub async fn healthz() -> impl Responder {
    HttpResponse::Ok().content_type(ContentType::plaintext()).body("ok")
}
