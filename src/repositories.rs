//! Storage accessors for the Pokedex entities.
//!
//! Each accessor trait wraps the basic queries the services need. They are implemented by
//! [`PgStore`](postgres::PgStore), backed by Postgres through [`diesel_async`]. Tests can use
//! `memory::MemoryStore` instead, which keeps everything in process and records every call it
//! receives; it is only built for unit tests or with the `test-store` feature.
//!
//! Lookups, updates and deletes by id report a missing row as a [`Query`](crate::Error::Query)
//! error whose source is [`NotFound`](diesel::result::Error::NotFound) (see
//! [`Error::is_not_found`](crate::Error::is_not_found)).

#[cfg(any(test, feature = "test-store"))]
#[doc(hidden)]
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::db::Pool;
use crate::models::pokemon::{NewPokemon, Pokemon};
use crate::models::pokemon_type::PokemonTypeAssociation;
use crate::models::types::{Type, TypeRequest};
use crate::models::user::{NewUser, User};
#[cfg(any(test, feature = "test-store"))]
use crate::repositories::memory::MemoryStore;
use crate::repositories::postgres::PgStore;

/// Accessor for the `pokemons` table.
#[async_trait]
pub trait PokemonRepository: Send + Sync {
    /// Fetches one pokemon.
    async fn get_pokemon(&self, pokemon_id: i64) -> crate::Result<Pokemon>;

    /// Lists all pokemons, ordered by id.
    async fn list_pokemons(&self) -> crate::Result<Vec<Pokemon>>;

    /// Lists the pokemons matching `filter`, one entry per pokemon.
    async fn list_pokemons_filtered(&self, filter: &PokemonFilter) -> crate::Result<Vec<Pokemon>>;

    /// Inserts a pokemon and returns the stored row, with its generated id.
    async fn create_pokemon(&self, new_pokemon: &NewPokemon) -> crate::Result<Pokemon>;

    /// Overwrites all columns of a pokemon.
    async fn update_pokemon(&self, pokemon_id: i64, pokemon: &NewPokemon)
        -> crate::Result<Pokemon>;

    /// Deletes a pokemon. Its associations are left alone.
    async fn delete_pokemon(&self, pokemon_id: i64) -> crate::Result<()>;
}

/// Accessor for the `pokemon_types` association table.
#[async_trait]
pub trait PokemonTypeRepository: Send + Sync {
    /// Lists the associations of a pokemon, in insertion order.
    ///
    /// The type name is joined from the `types` table; associations pointing at a type that does
    /// not exist (like the sentinel `0`) are not returned.
    async fn list_associations(&self, pokemon_id: i64) -> crate::Result<Vec<PokemonTypeAssociation>>;

    /// Creates an association and returns its id.
    async fn create_association(&self, pokemon_id: i64, type_id: i64) -> crate::Result<i64>;

    /// Repoints an existing association.
    async fn update_association(
        &self,
        association_id: i64,
        pokemon_id: i64,
        type_id: i64,
    ) -> crate::Result<()>;

    /// Deletes all associations of a pokemon and returns how many were removed.
    async fn delete_associations_by_pokemon(&self, pokemon_id: i64) -> crate::Result<usize>;

    /// Deletes a single association.
    async fn delete_association(&self, association_id: i64) -> crate::Result<()>;
}

/// Accessor for the `types` table.
#[async_trait]
pub trait TypeRepository: Send + Sync {
    /// Lists all types, ordered by id.
    async fn list_types(&self) -> crate::Result<Vec<Type>>;

    /// Fetches one type.
    async fn get_type(&self, type_id: i64) -> crate::Result<Type>;

    /// Inserts a type.
    async fn create_type(&self, new_type: &TypeRequest) -> crate::Result<Type>;

    /// Renames a type.
    async fn update_type(&self, type_id: i64, updated_type: &TypeRequest) -> crate::Result<Type>;

    /// Deletes a type.
    async fn delete_type(&self, type_id: i64) -> crate::Result<()>;
}

/// Accessor for the `users` table.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetches a user by exact username.
    async fn get_user_by_username(&self, username: &str) -> crate::Result<User>;

    /// Inserts a user and returns its id.
    async fn create_user(&self, new_user: NewUser) -> crate::Result<i64>;
}

/// Criteria used by [`PokemonRepository::list_pokemons_filtered`].
///
/// All criteria are combined; an empty filter matches every pokemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PokemonFilter {
    /// Substring that the pokemon name must contain (case-sensitive).
    pub name: Option<String>,

    /// Exact catch state (0 or 1).
    pub caught: Option<i32>,

    /// The pokemon must be associated with at least one of these types.
    pub type_ids: Vec<i64>,

    /// Ordering of the results; by id when not specified.
    pub sort: Option<PokemonSort>,
}

impl PokemonFilter {
    /// Returns `true` if no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.caught.is_none() && self.type_ids.is_empty() && self.sort.is_none()
    }
}

/// Ordering applied to a filtered pokemon list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PokemonSort {
    /// Column to order by
    pub column: SortColumn,

    /// Direction
    pub order: SortOrder,
}

/// Columns a pokemon list can be ordered by.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum SortColumn {
    Id,
    Name,
    Species,
    #[serde(alias = "catched")]
    Caught,
}

/// Sort direction.
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// The set of accessors used by the services, sharing one storage backend.
#[derive(Clone)]
pub struct Repositories {
    /// Accessor for pokemons
    pub pokemons: Arc<dyn PokemonRepository>,

    /// Accessor for pokemon/type associations
    pub pokemon_types: Arc<dyn PokemonTypeRepository>,

    /// Accessor for types
    pub types: Arc<dyn TypeRepository>,

    /// Accessor for users
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Accessors backed by Postgres, using the given connection [`Pool`].
    pub fn postgres(pool: Pool) -> Self {
        Self::from_store(Arc::new(PgStore::new(pool)))
    }

    /// Accessors backed by an in-process [`MemoryStore`].
    ///
    /// The store is shared: the caller's handle sees every change and call made through the
    /// returned accessors.
    #[cfg(any(test, feature = "test-store"))]
    #[doc(hidden)]
    pub fn memory(store: MemoryStore) -> Self {
        Self::from_store(Arc::new(store))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: PokemonRepository + PokemonTypeRepository + TypeRepository + UserRepository + 'static,
    {
        Self {
            pokemons: store.clone(),
            pokemon_types: store.clone(),
            types: store.clone(),
            users: store,
        }
    }
}
