//! Models used to create/update/load pokemons, plus the detail and list views returned by the API.

pub mod metadata;
pub mod validations;

use diesel_derives::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::{ToResponse, ToSchema};
use validations::validate_type_ids;
use validator::Validate;

use crate::models::pokemon::metadata::PokemonMetadata;
use crate::models::pokemon_type::PokemonTypeAssociation;
use crate::schema::pokemons;

/// Value of [`Pokemon::caught`] for a Pokemon that has not been caught yet.
pub const NOT_CAUGHT: i32 = 0;

/// Value of [`Pokemon::caught`] for a caught Pokemon.
pub const CAUGHT: i32 = 1;

/// Row of the `pokemons` table.
///
/// Secondary attributes are kept encoded in [`metadata`](Pokemon::metadata); see
/// [`PokemonMetadata`] for the codec.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = pokemons, check_for_backend(diesel::pg::Pg))]
#[allow(missing_docs)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub caught: i32,
    pub metadata: String,
}

/// Model used to insert or overwrite a row of the `pokemons` table.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = pokemons)]
#[allow(missing_docs)]
pub struct NewPokemon {
    pub name: String,
    pub species: String,
    pub caught: i32,
    pub metadata: String,
}

impl From<Pokemon> for NewPokemon {
    fn from(value: Pokemon) -> Self {
        Self {
            name: value.name,
            species: value.species,
            caught: value.caught,
            metadata: value.metadata,
        }
    }
}

#[cfg_attr(
    doc,
    doc = r"
        Body of the requests that create or update a Pokemon.

        [`types`](PokemonRequest::types) is the ordered list of type ids to associate with the
        Pokemon; order and duplicates are kept. The secondary attributes are given at the top
        level of the JSON object, next to the other fields.
    "
)]
#[cfg_attr(not(doc), doc = "Information to create or update a Pokemon in the Pokedex")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Bulbasaur",
    "species": "Seed Pokemon",
    "types": [4, 7],
    "caught": 0,
    "image_url": "https://img.pokemondb.net/artwork/bulbasaur.jpg",
    "description": "A strange seed was planted on its back at birth.",
    "weight": 6.9,
    "height": 0.7,
    "stats": { "hp": 45, "attack": 49, "defense": 49, "speed": 45 }
}))]
pub struct PokemonRequest {
    /// Pokemon name
    #[validate(length(min = 1))]
    pub name: String,

    /// Pokemon species
    #[serde(default)]
    pub species: String,

    /// Ids of the Pokemon's types, in order
    #[serde(default)]
    #[validate(custom = "validate_type_ids")]
    pub types: Vec<i64>,

    /// Whether the Pokemon has been caught (0 or 1)
    #[serde(default, alias = "catched")]
    #[validate(range(min = 0, max = 1))]
    pub caught: i32,

    /// Secondary attributes
    #[serde(flatten)]
    #[validate]
    pub metadata: PokemonMetadata,
}

impl PokemonRequest {
    /// Builds the row to store for this request, encoding the secondary attributes.
    pub fn to_new_pokemon(&self) -> crate::Result<NewPokemon> {
        Ok(NewPokemon {
            name: self.name.clone(),
            species: self.species.clone(),
            caught: self.caught,
            metadata: self.metadata.encode()?,
        })
    }
}

/// Full view of a Pokemon, returned by the get/create/update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, ToResponse)]
#[response(
    description = "Pokemon information",
    example = json!({
        "id": 1,
        "name": "Bulbasaur",
        "species": "Seed Pokemon",
        "types": ["Grass", "Poison"],
        "caught": 0,
        "image_url": "https://img.pokemondb.net/artwork/bulbasaur.jpg",
        "description": "A strange seed was planted on its back at birth.",
        "weight": 6.9,
        "height": 0.7,
        "stats": { "hp": 45, "attack": 49, "defense": 49, "speed": 45 }
    }),
)]
pub struct PokemonDetail {
    /// Unique id of the Pokemon
    pub id: i64,

    /// Pokemon name
    pub name: String,

    /// Pokemon species
    pub species: String,

    /// Names of the Pokemon's types, in association order
    pub types: Vec<String>,

    /// Whether the Pokemon has been caught (0 or 1)
    pub caught: i32,

    /// Secondary attributes
    #[serde(flatten)]
    pub metadata: PokemonMetadata,
}

impl PokemonDetail {
    /// Builds the detail view of a Pokemon from its row and its type associations.
    ///
    /// Fails if the stored metadata cannot be decoded.
    pub fn build(pokemon: Pokemon, associations: &[PokemonTypeAssociation]) -> crate::Result<Self> {
        let metadata = PokemonMetadata::decode(&pokemon.metadata)?;

        Ok(Self {
            id: pokemon.id,
            name: pokemon.name,
            species: pokemon.species,
            types: live_type_names(associations),
            caught: pokemon.caught,
            metadata,
        })
    }
}

/// Condensed view of a Pokemon, returned by the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PokemonSummary {
    /// Unique id of the Pokemon
    pub id: i64,

    /// Pokemon name
    pub name: String,

    /// Pokemon species
    pub species: String,

    /// Names of the Pokemon's types, in association order
    pub types: Vec<String>,

    /// Whether the Pokemon has been caught (0 or 1)
    pub caught: i32,

    /// URL of a picture of the Pokemon
    pub image_url: String,
}

impl PokemonSummary {
    /// Builds the list view of a Pokemon. Like [`PokemonDetail::build`], fails on bad metadata.
    pub fn build(pokemon: Pokemon, associations: &[PokemonTypeAssociation]) -> crate::Result<Self> {
        let metadata = PokemonMetadata::decode(&pokemon.metadata)?;

        Ok(Self {
            id: pokemon.id,
            name: pokemon.name,
            species: pokemon.species,
            types: live_type_names(associations),
            caught: pokemon.caught,
            image_url: metadata.image_url,
        })
    }
}

/// Names of the associations that still point to a type.
fn live_type_names(associations: &[PokemonTypeAssociation]) -> Vec<String> {
    associations
        .iter()
        .filter(|association| association.is_live())
        .map(|association| association.name.clone())
        .collect()
}
