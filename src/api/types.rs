//! Implementation of the Pokedex REST API endpoints for pokemon types.
//!
//! # Endpoints
//!
//! | HTTP method | Endpoint                        | Usage                        | See                       |
//! |-------------|---------------------------------|------------------------------|---------------------------|
//! | `GET`       | `/pokedex/types`                | Lists all types              | [`list`]                  |
//! | `GET`       | `/internal/pokedex/types`       | Same as the public list      | [`list`]                  |
//! | `POST`      | `/internal/pokedex/types`       | Adds a new type              | [`create`]                |
//! | `GET`       | `/internal/pokedex/types/{id}`  | Returns one type             | [`get`](struct@get)       |
//! | `PUT`       | `/internal/pokedex/types/{id}`  | Renames a type               | [`update`]                |
//! | `DELETE`    | `/internal/pokedex/types/{id}`  | Deletes a type               | [`delete`](struct@delete) |

use actix_web::web::{Data, ServiceConfig};
use actix_web::{delete, get, post, put, HttpResponse};
use actix_web_validator::{Json, Path};
use log::trace;

use crate::api::doc::{
    ForbiddenResponse, IdNotFoundResponse, InvalidIdParamResponse, ServerErrorResponse,
    UnauthenticatedResponse,
};
use crate::api::{HttpResult, Id};
use crate::models::types::{Type, TypeRequest};
use crate::services::types;

/// Registers the type endpoints of the `/pokedex` scope.
pub fn configure_public(config: &mut ServiceConfig) {
    trace!("Adding public type endpoints");
    config.service(list);
}

/// Registers the type endpoints of the `/internal/pokedex` scope.
pub fn configure_internal(config: &mut ServiceConfig) {
    trace!("Adding internal type endpoints");
    config
        .service(list)
        .service(create)
        .service(get)
        .service(update)
        .service(delete);
}

/// Lists all Pokemon types, ordered by id
#[utoipa::path(
    context_path = "/pokedex",
    responses(
        (status = OK, body = Vec<Type>),
        ServerErrorResponse,
    ),
)]
#[get("/types")]
pub async fn list(service: Data<types::Service>) -> HttpResult {
    let types = service.get_ref().list_types().await?;

    Ok(HttpResponse::Ok().json(types))
}

/// Returns one Pokemon type
#[utoipa::path(
    context_path = "/internal/pokedex",
    params(Id),
    responses(
        (status = OK, response = Type),
        InvalidIdParamResponse,
        UnauthenticatedResponse,
        ForbiddenResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[get("/types/{id}")]
pub async fn get(id: Path<Id>, service: Data<types::Service>) -> HttpResult {
    let pokemon_type = service.get_ref().get_type(*id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(pokemon_type))
}

/// Creates a new Pokemon type
#[utoipa::path(
    context_path = "/internal/pokedex",
    request_body(content = TypeRequest, description = "New type information"),
    responses(
        (status = CREATED, response = Type),
        (status = BAD_REQUEST, description = "Invalid type information in request body"),
        UnauthenticatedResponse,
        ForbiddenResponse,
        ServerErrorResponse,
    ),
)]
#[post("/types")]
pub async fn create(request: Json<TypeRequest>, service: Data<types::Service>) -> HttpResult {
    let pokemon_type = service.get_ref().create_type(&request).await?;

    Ok(HttpResponse::Created().json(pokemon_type))
}

/// Renames a Pokemon type
#[utoipa::path(
    context_path = "/internal/pokedex",
    params(Id),
    request_body(content = TypeRequest, description = "Updated type information"),
    responses(
        (status = OK, response = Type),
        (status = BAD_REQUEST, description = "Invalid id path parameter OR type information"),
        UnauthenticatedResponse,
        ForbiddenResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[put("/types/{id}")]
pub async fn update(
    id: Path<Id>,
    request: Json<TypeRequest>,
    service: Data<types::Service>,
) -> HttpResult {
    let pokemon_type = service
        .get_ref()
        .update_type(*id.into_inner(), &request)
        .await?;

    Ok(HttpResponse::Ok().json(pokemon_type))
}

/// Deletes a Pokemon type.
///
/// Pokemons associated with the type keep their association row, but the type no longer shows
/// up in their type list.
#[utoipa::path(
    context_path = "/internal/pokedex",
    params(Id),
    responses(
        (status = NO_CONTENT, description = "Type deleted from Pokedex"),
        InvalidIdParamResponse,
        UnauthenticatedResponse,
        ForbiddenResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[delete("/types/{id}")]
pub async fn delete(id: Path<Id>, service: Data<types::Service>) -> HttpResult {
    service.get_ref().delete_type(*id.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}
