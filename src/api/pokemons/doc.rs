//! [`IntoResponses`] wrappers for the pokemon endpoints.
//!
//! These helper types are used to document the possible API responses using [`utoipa::path`].

use utoipa::IntoResponses;

/// [`IntoResponses`] wrapper for bad list query parameters.
///
/// Can be used to document 400 API error responses using [`utoipa::path`].
#[derive(Debug, IntoResponses)]
#[response(status = BAD_REQUEST, description = "Invalid value for a list query parameter")]
pub struct InvalidListParamsResponse;

/// [`IntoResponses`] wrapper for bad Pokemon request body error.
///
/// Can be used to document 400 API error responses using [`utoipa::path`].
#[derive(Debug, IntoResponses)]
#[response(status = BAD_REQUEST, description = "Invalid Pokemon information in request body")]
pub struct InvalidPokemonBodyResponse;

/// [`IntoResponses`] wrapper for bad `id` path parameter OR bad Pokemon request body error.
///
/// Can be used to document 400 API error responses using [`utoipa::path`].
#[derive(Debug, IntoResponses)]
#[response(
    status = BAD_REQUEST,
    description = "Invalid value for id path parameter OR invalid Pokemon information in request body",
)]
pub struct InvalidIdParamOrPokemonBodyResponse;
