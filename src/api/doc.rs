//! OpenAPI documentation support.

use actix_web::web::ServiceConfig;
use log::trace;
use utoipa::{IntoResponses, OpenApi};
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::api::accounts::MessageResponse;
use crate::api::errors::ErrorResponse;
use crate::auth::Role;
use crate::models::pokemon::metadata::{PokemonMetadata, Stats};
use crate::models::pokemon::{PokemonDetail, PokemonRequest, PokemonSummary};
use crate::models::types::{Type, TypeRequest};
use crate::models::user::{LoginRequest, RegisterRequest, RegisteredUser};
use crate::repositories::{SortColumn, SortOrder};

/// Registers the various OpenAPI-related endpoints, like swagger UI.
///
/// Called automatically from [`configure_api`](crate::configure_api).
pub fn configure(config: &mut ServiceConfig) {
    trace!("Adding OpenAPI doc endpoints");

    let openapi = ApiDoc::openapi();
    config
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
        )
        .service(Redoc::with_url("/redoc", openapi.clone()))
        .service(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"));
}

/// API documentation in OpenAPI format.
///
/// Generated automatically by the [`utoipa`] crate. To use, simply call [`ApiDoc::openapi`]
/// to create an instance, then pass it to the various helpers that allow the API doc to be
/// published, like [`SwaggerUi`].
#[derive(OpenApi)]
#[openapi(
    paths(
        api::healthz,
        api::accounts::register,
        api::accounts::login,
        api::accounts::logout,
        api::pokemons::list,
        api::pokemons::get,
        api::pokemons::catch,
        api::pokemons::create,
        api::pokemons::update,
        api::pokemons::delete,
        api::types::list,
        api::types::get,
        api::types::create,
        api::types::update,
        api::types::delete,
    ),
    components(
        schemas(
            PokemonRequest,
            PokemonSummary,
            PokemonMetadata,
            Stats,
            SortColumn,
            SortOrder,
            TypeRequest,
            RegisterRequest,
            LoginRequest,
            RegisteredUser,
            MessageResponse,
            Role,
        ),
        responses(PokemonDetail, Type, ErrorResponse),
    )
)]
pub struct ApiDoc;

/// [`IntoResponses`] wrapper for bad `id` path parameter errors.
///
/// Can be used to document 400 API error responses using [`utoipa::path`].
#[derive(Debug, IntoResponses)]
#[response(status = BAD_REQUEST, description = "Invalid value for id path parameter")]
pub struct InvalidIdParamResponse;

/// [`IntoResponses`] wrapper for `entity not found` errors.
#[derive(Debug, IntoResponses)]
#[response(status = NOT_FOUND, description = "Requested entity not found in database")]
pub struct IdNotFoundResponse;

/// [`IntoResponses`] wrapper for calls without a valid session.
#[derive(Debug, IntoResponses)]
#[response(status = UNAUTHORIZED, description = "Missing, expired or invalid session cookie")]
pub struct UnauthenticatedResponse;

/// [`IntoResponses`] wrapper for calls whose session role is too low.
#[derive(Debug, IntoResponses)]
#[response(status = FORBIDDEN, description = "Session role does not allow this endpoint")]
pub struct ForbiddenResponse;

/// [`IntoResponses`] wrapper for internal server errors.
///
/// Can be used to document 5XX API error responses using [`utoipa::path`].
#[derive(Debug, IntoResponses)]
#[response(status = "5XX")]
pub struct ServerErrorResponse(#[to_response] ErrorResponse);
