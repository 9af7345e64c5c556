//! Implementation of the Pokedex REST API endpoints for pokemons.
//!
//! # Endpoints
//!
//! | HTTP method | Endpoint                                  | Usage                                    | See                       |
//! |-------------|-------------------------------------------|------------------------------------------|---------------------------|
//! | `GET`       | `/pokedex/pokemons`                       | Lists pokemons, optionally filtered      | [`list`]                  |
//! | `GET`       | `/pokedex/pokemons/{id}`                  | Returns one pokemon, using its ID        | [`get`](struct@get)       |
//! | `POST`      | `/user/pokedex/pokemons/{id}/catch`       | Marks a pokemon as caught                | [`catch`]                 |
//! | `GET`       | `/internal/pokedex/pokemons`              | Same as the public list                  | [`list`]                  |
//! | `POST`      | `/internal/pokedex/pokemons`              | Adds a new pokemon                       | [`create`]                |
//! | `GET`       | `/internal/pokedex/pokemons/{id}`         | Same as the public get                   | [`get`](struct@get)       |
//! | `PUT`       | `/internal/pokedex/pokemons/{id}`         | Overwrites a pokemon and its types       | [`update`]                |
//! | `DELETE`    | `/internal/pokedex/pokemons/{id}`         | Deletes a pokemon and its types          | [`delete`](struct@delete) |

pub mod doc;

use actix_web::web::{Data, ServiceConfig};
use actix_web::{delete, get, post, put, HttpResponse};
use actix_web_validator::{Json, Path, Query};
use log::trace;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

use crate::api::doc::{
    ForbiddenResponse, IdNotFoundResponse, InvalidIdParamResponse, ServerErrorResponse,
    UnauthenticatedResponse,
};
use crate::api::pokemons::doc::{
    InvalidIdParamOrPokemonBodyResponse, InvalidListParamsResponse, InvalidPokemonBodyResponse,
};
use crate::api::{HttpResult, Id};
use crate::models::pokemon::{PokemonDetail, PokemonRequest};
use crate::repositories::{PokemonFilter, PokemonSort, SortColumn, SortOrder};
use crate::services::pokemon;
use crate::Error;

/// Registers the read-only pokemon endpoints of the `/pokedex` scope.
pub fn configure_public(config: &mut ServiceConfig) {
    trace!("Adding public pokemon endpoints");
    config.service(list).service(get);
}

/// Registers the pokemon endpoints of the `/user/pokedex` scope.
pub fn configure_user(config: &mut ServiceConfig) {
    trace!("Adding user pokemon endpoints");
    config.service(catch);
}

/// Registers the pokemon endpoints of the `/internal/pokedex` scope.
pub fn configure_internal(config: &mut ServiceConfig) {
    trace!("Adding internal pokemon endpoints");
    config
        .service(list)
        .service(create)
        .service(get)
        .service(update)
        .service(delete);
}

/// Query parameters for the [list endpoint](list). All are optional; unknown ones are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, IntoParams)]
#[serde(default)]
pub struct ListParams {
    /// Only return pokemons whose name contains this string
    pub name: Option<String>,

    /// Only return pokemons with this catch state (0: not caught, 1: caught)
    #[validate(range(min = 0, max = 1))]
    #[param(minimum = 0, maximum = 1)]
    pub options: Option<i32>,

    /// Only return pokemons having at least one of these types (comma-separated type ids)
    #[serde(rename = "type")]
    #[param(example = "1,4")]
    pub types: Option<String>,

    /// Column to sort by
    pub sort_by: Option<SortColumn>,

    /// Sort direction, used with `sort_by` (default: `asc`)
    pub order_by: Option<SortOrder>,
}

impl ListParams {
    /// Builds the storage filter matching these parameters.
    pub fn to_filter(&self) -> crate::Result<PokemonFilter> {
        Ok(PokemonFilter {
            name: self.name.clone().filter(|name| !name.is_empty()),
            caught: self.options,
            type_ids: parse_type_ids(self.types.as_deref().unwrap_or_default())?,
            sort: self.sort_by.map(|column| PokemonSort {
                column,
                order: self.order_by.unwrap_or_default(),
            }),
        })
    }
}

fn parse_type_ids(value: &str) -> crate::Result<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>().map_err(|_| Error::Validation {
                message: format!("invalid type id in type filter: {}", id),
            })
        })
        .collect()
}

#[cfg_attr(
    doc,
    doc = r"
        API endpoint to list pokemons.

        Registered as `GET /pokedex/pokemons` and `GET /internal/pokedex/pokemons`.

        # Input

        | Query parameter | Usage                                              |
        |-----------------|----------------------------------------------------|
        | `name`          | Substring of the pokemon name                      |
        | `options`       | Catch state (0 or 1)                               |
        | `type`          | Comma-separated type ids; any of them must match   |
        | `sort_by`       | `id`, `name`, `species` or `caught`                |
        | `order_by`      | `asc` (default) or `desc`                          |

        # Output

        A list of [`PokemonSummary`](crate::models::pokemon::PokemonSummary), serialized as JSON.
        Without any parameter, pokemons are ordered by id.
    "
)]
#[cfg_attr(not(doc), doc = "Lists Pokemons in the Pokedex")]
#[utoipa::path(
    context_path = "/pokedex",
    params(ListParams),
    responses(
        (status = OK, body = Vec<crate::models::pokemon::PokemonSummary>),
        InvalidListParamsResponse,
        ServerErrorResponse,
    ),
)]
#[get("/pokemons")]
pub async fn list(params: Query<ListParams>, service: Data<pokemon::Service>) -> HttpResult {
    let filter = params.to_filter()?;
    let pokemons = service.get_ref().list_pokemons(&filter).await?;

    Ok(HttpResponse::Ok().json(pokemons))
}

#[cfg_attr(
    doc,
    doc = r"
        API endpoint to fetch one pokemon.

        Registered as `GET /pokedex/pokemons/{id}` and `GET /internal/pokedex/pokemons/{id}`.

        # Output

        A [`PokemonDetail`], serialized as JSON.
    "
)]
#[cfg_attr(not(doc), doc = "Returns information about a Pokemon")]
#[utoipa::path(
    context_path = "/pokedex",
    params(Id),
    responses(
        (status = OK, response = PokemonDetail),
        InvalidIdParamResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[get("/pokemons/{id}")]
pub async fn get(id: Path<Id>, service: Data<pokemon::Service>) -> HttpResult {
    let pokemon = service.get_ref().get_pokemon(*id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(pokemon))
}

/// Marks a Pokemon as caught. Catching an already-caught Pokemon changes nothing.
#[utoipa::path(
    context_path = "/user/pokedex",
    params(Id),
    responses(
        (status = OK, response = PokemonDetail),
        InvalidIdParamResponse,
        UnauthenticatedResponse,
        ForbiddenResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[post("/pokemons/{id}/catch")]
pub async fn catch(id: Path<Id>, service: Data<pokemon::Service>) -> HttpResult {
    let pokemon = service.get_ref().catch_pokemon(*id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(pokemon))
}

#[cfg_attr(
    doc,
    doc = r"
        API endpoint to add a new pokemon.

        Registered as `POST /internal/pokedex/pokemons`.

        # Input

        - Request body: the pokemon data, as a JSON-serialized [`PokemonRequest`]. The pokemon
          is associated with the listed types, in order.

        # Output

        The newly-inserted [`PokemonDetail`], serialized as JSON.
    "
)]
#[cfg_attr(not(doc), doc = "Creates a new Pokemon")]
#[utoipa::path(
    context_path = "/internal/pokedex",
    request_body(content = PokemonRequest, description = "New Pokemon information"),
    responses(
        (status = CREATED, response = PokemonDetail),
        InvalidPokemonBodyResponse,
        UnauthenticatedResponse,
        ForbiddenResponse,
        ServerErrorResponse,
    ),
)]
#[post("/pokemons")]
pub async fn create(request: Json<PokemonRequest>, service: Data<pokemon::Service>) -> HttpResult {
    let pokemon = service.get_ref().create_pokemon(&request).await?;

    Ok(HttpResponse::Created().json(pokemon))
}

#[cfg_attr(
    doc,
    doc = r"
        API endpoint to overwrite a pokemon.

        Registered as `PUT /internal/pokedex/pokemons/{id}`.

        # Input

        - `{id}`: ID of pokemon to update.
        - Request body: the full pokemon data, as a JSON-serialized [`PokemonRequest`].

        The pokemon's type associations are compared position by position with the requested
        types: differing positions are updated, extra requested types are added, and extra
        stored associations are pointed at type `0` instead of being deleted.

        # Output

        The updated [`PokemonDetail`], serialized as JSON.
    "
)]
#[cfg_attr(not(doc), doc = "Updates a Pokemon")]
#[utoipa::path(
    context_path = "/internal/pokedex",
    params(Id),
    request_body(content = PokemonRequest, description = "Updated Pokemon information"),
    responses(
        (status = OK, response = PokemonDetail),
        InvalidIdParamOrPokemonBodyResponse,
        UnauthenticatedResponse,
        ForbiddenResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[put("/pokemons/{id}")]
pub async fn update(
    id: Path<Id>,
    request: Json<PokemonRequest>,
    service: Data<pokemon::Service>,
) -> HttpResult {
    let pokemon = service
        .get_ref()
        .update_pokemon(*id.into_inner(), &request)
        .await?;

    Ok(HttpResponse::Ok().json(pokemon))
}

#[cfg_attr(
    doc,
    doc = r"
        API endpoint to delete a pokemon along with its type associations.

        Registered as `DELETE /internal/pokedex/pokemons/{id}`.

        # Output

        This endpoint simply returns `HTTP 204 No Content` upon success.
    "
)]
#[cfg_attr(not(doc), doc = "Deletes a Pokemon")]
#[utoipa::path(
    context_path = "/internal/pokedex",
    params(Id),
    responses(
        (status = NO_CONTENT, description = "Pokemon deleted from Pokedex"),
        InvalidIdParamResponse,
        UnauthenticatedResponse,
        ForbiddenResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[delete("/pokemons/{id}")]
pub async fn delete(id: Path<Id>, service: Data<pokemon::Service>) -> HttpResult {
    service.get_ref().delete_pokemon(*id.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}
