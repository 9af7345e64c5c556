//! In-process implementation of the storage accessors.
//!
//! [`MemoryStore`] mirrors what [`PgStore`](crate::repositories::postgres::PgStore) does,
//! including the inner join used to list associations, without needing a database. Every call
//! it receives is recorded as a [`StoreCall`], and any operation can be made to fail once with
//! [`MemoryStore::fail_next`]. The services' tests and the HTTP integration tests run on it.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use strum_macros::EnumDiscriminants;

use crate::error::QueryContext;
use crate::models::pokemon::{NewPokemon, Pokemon};
use crate::models::pokemon_type::PokemonTypeAssociation;
use crate::models::types::{Type, TypeRequest};
use crate::models::user::{NewUser, User};
use crate::repositories::{
    PokemonFilter, PokemonRepository, PokemonTypeRepository, SortColumn, SortOrder,
    TypeRepository, UserRepository,
};

/// A call received by a [`MemoryStore`].
///
/// [`StoreOperation`] is the matching field-less enum, used to count calls or inject failures.
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(StoreOperation), derive(Hash))]
#[allow(missing_docs)]
pub enum StoreCall {
    GetPokemon { pokemon_id: i64 },
    ListPokemons,
    ListPokemonsFiltered { filter: PokemonFilter },
    CreatePokemon { name: String },
    UpdatePokemon { pokemon_id: i64 },
    DeletePokemon { pokemon_id: i64 },
    ListAssociations { pokemon_id: i64 },
    CreateAssociation { pokemon_id: i64, type_id: i64 },
    UpdateAssociation { association_id: i64, pokemon_id: i64, type_id: i64 },
    DeleteAssociationsByPokemon { pokemon_id: i64 },
    DeleteAssociation { association_id: i64 },
    ListTypes,
    GetType { type_id: i64 },
    CreateType { name: String },
    UpdateType { type_id: i64 },
    DeleteType { type_id: i64 },
    GetUserByUsername { username: String },
    CreateUser { username: String },
}

/// Raw association row, as stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct AssociationRow {
    pokemon_id: i64,
    type_id: i64,
}

#[derive(Debug, Default)]
struct State {
    pokemons: BTreeMap<i64, Pokemon>,
    associations: BTreeMap<i64, AssociationRow>,
    types: BTreeMap<i64, Type>,
    users: BTreeMap<i64, User>,
    last_ids: [i64; 4],
    calls: Vec<StoreCall>,
    failures: HashSet<StoreOperation>,
}

/// Index of each table in [`State::last_ids`].
#[derive(Debug, Copy, Clone)]
enum Table {
    Pokemons = 0,
    Associations = 1,
    Types = 2,
    Users = 3,
}

impl State {
    /// Records `call`, failing if a failure was injected for its operation.
    fn record(&mut self, call: StoreCall) -> crate::Result<()> {
        let operation = StoreOperation::from(&call);
        self.calls.push(call);

        if self.failures.remove(&operation) {
            Err(diesel::result::Error::BrokenTransactionManager)
                .with_query_context(|| format!("injected failure for {:?}", operation))
        } else {
            Ok(())
        }
    }

    fn next_id(&mut self, table: Table) -> i64 {
        let last_id = &mut self.last_ids[table as usize];
        *last_id += 1;
        *last_id
    }
}

/// Reports a missing row the same way diesel does.
fn not_found<T>(context: String) -> crate::Result<T> {
    Err(diesel::result::Error::NotFound).with_query_context(|| context)
}

/// Storage accessors keeping all data in memory.
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all calls received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Returns how many calls of the given operation were received so far.
    pub fn count(&self, operation: StoreOperation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| StoreOperation::from(*call) == operation)
            .count()
    }

    /// Forgets the calls received so far. Data is kept.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Makes the next call of `operation` fail with a storage error.
    pub fn fail_next(&self, operation: StoreOperation) {
        self.lock().failures.insert(operation);
    }

    /// Returns the `(association id, type id)` rows of a pokemon, including those pointing at a
    /// missing type, in insertion order.
    pub fn raw_associations(&self, pokemon_id: i64) -> Vec<(i64, i64)> {
        self.lock()
            .associations
            .iter()
            .filter(|(_, row)| row.pokemon_id == pokemon_id)
            .map(|(&id, row)| (id, row.type_id))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches_filter(state: &State, pokemon: &Pokemon, filter: &PokemonFilter) -> bool {
    let name_matches = filter
        .name
        .as_deref()
        .map_or(true, |name| pokemon.name.contains(name));
    let caught_matches = filter.caught.map_or(true, |caught| pokemon.caught == caught);
    let type_matches = filter.type_ids.is_empty()
        || state.associations.values().any(|row| {
            row.pokemon_id == pokemon.id && filter.type_ids.contains(&row.type_id)
        });

    name_matches && caught_matches && type_matches
}

#[async_trait]
impl PokemonRepository for MemoryStore {
    async fn get_pokemon(&self, pokemon_id: i64) -> crate::Result<Pokemon> {
        let mut state = self.lock();
        state.record(StoreCall::GetPokemon { pokemon_id })?;

        match state.pokemons.get(&pokemon_id) {
            Some(pokemon) => Ok(pokemon.clone()),
            None => not_found(format!("failed to fetch pokemon {}", pokemon_id)),
        }
    }

    async fn list_pokemons(&self) -> crate::Result<Vec<Pokemon>> {
        let mut state = self.lock();
        state.record(StoreCall::ListPokemons)?;

        Ok(state.pokemons.values().cloned().collect())
    }

    async fn list_pokemons_filtered(&self, filter: &PokemonFilter) -> crate::Result<Vec<Pokemon>> {
        let mut state = self.lock();
        state.record(StoreCall::ListPokemonsFiltered { filter: filter.clone() })?;

        let mut results: Vec<Pokemon> = state
            .pokemons
            .values()
            .filter(|pokemon| matches_filter(&state, pokemon, filter))
            .cloned()
            .collect();

        if let Some(sort) = filter.sort {
            results.sort_by(|a, b| {
                let ordering = match sort.column {
                    SortColumn::Id => a.id.cmp(&b.id),
                    SortColumn::Name => a.name.cmp(&b.name),
                    SortColumn::Species => a.species.cmp(&b.species),
                    SortColumn::Caught => a.caught.cmp(&b.caught),
                };
                let ordering = match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                };
                ordering.then(a.id.cmp(&b.id))
            });
        }

        Ok(results)
    }

    async fn create_pokemon(&self, new_pokemon: &NewPokemon) -> crate::Result<Pokemon> {
        let mut state = self.lock();
        state.record(StoreCall::CreatePokemon { name: new_pokemon.name.clone() })?;

        let pokemon = Pokemon {
            id: state.next_id(Table::Pokemons),
            name: new_pokemon.name.clone(),
            species: new_pokemon.species.clone(),
            caught: new_pokemon.caught,
            metadata: new_pokemon.metadata.clone(),
        };
        state.pokemons.insert(pokemon.id, pokemon.clone());

        Ok(pokemon)
    }

    async fn update_pokemon(
        &self,
        pokemon_id: i64,
        pokemon: &NewPokemon,
    ) -> crate::Result<Pokemon> {
        let mut state = self.lock();
        state.record(StoreCall::UpdatePokemon { pokemon_id })?;

        match state.pokemons.get_mut(&pokemon_id) {
            Some(stored) => {
                stored.name = pokemon.name.clone();
                stored.species = pokemon.species.clone();
                stored.caught = pokemon.caught;
                stored.metadata = pokemon.metadata.clone();
                Ok(stored.clone())
            },
            None => not_found(format!("failed to update pokemon {}", pokemon_id)),
        }
    }

    async fn delete_pokemon(&self, pokemon_id: i64) -> crate::Result<()> {
        let mut state = self.lock();
        state.record(StoreCall::DeletePokemon { pokemon_id })?;

        match state.pokemons.remove(&pokemon_id) {
            Some(_) => Ok(()),
            None => not_found(format!("failed to delete pokemon {}", pokemon_id)),
        }
    }
}

#[async_trait]
impl PokemonTypeRepository for MemoryStore {
    async fn list_associations(&self, pokemon_id: i64) -> crate::Result<Vec<PokemonTypeAssociation>> {
        let mut state = self.lock();
        state.record(StoreCall::ListAssociations { pokemon_id })?;

        Ok(state
            .associations
            .iter()
            .filter(|(_, row)| row.pokemon_id == pokemon_id)
            .filter_map(|(&id, row)| {
                state.types.get(&row.type_id).map(|pokemon_type| PokemonTypeAssociation {
                    id,
                    pokemon_id: row.pokemon_id,
                    type_id: row.type_id,
                    name: pokemon_type.name.clone(),
                })
            })
            .collect())
    }

    async fn create_association(&self, pokemon_id: i64, type_id: i64) -> crate::Result<i64> {
        let mut state = self.lock();
        state.record(StoreCall::CreateAssociation { pokemon_id, type_id })?;

        let id = state.next_id(Table::Associations);
        state.associations.insert(id, AssociationRow { pokemon_id, type_id });

        Ok(id)
    }

    async fn update_association(
        &self,
        association_id: i64,
        pokemon_id: i64,
        type_id: i64,
    ) -> crate::Result<()> {
        let mut state = self.lock();
        state.record(StoreCall::UpdateAssociation { association_id, pokemon_id, type_id })?;

        match state.associations.get_mut(&association_id) {
            Some(row) => {
                *row = AssociationRow { pokemon_id, type_id };
                Ok(())
            },
            None => not_found(format!("failed to update pokemon type {}", association_id)),
        }
    }

    async fn delete_associations_by_pokemon(&self, pokemon_id: i64) -> crate::Result<usize> {
        let mut state = self.lock();
        state.record(StoreCall::DeleteAssociationsByPokemon { pokemon_id })?;

        let before = state.associations.len();
        state.associations.retain(|_, row| row.pokemon_id != pokemon_id);

        Ok(before - state.associations.len())
    }

    async fn delete_association(&self, association_id: i64) -> crate::Result<()> {
        let mut state = self.lock();
        state.record(StoreCall::DeleteAssociation { association_id })?;

        match state.associations.remove(&association_id) {
            Some(_) => Ok(()),
            None => not_found(format!("failed to delete pokemon type {}", association_id)),
        }
    }
}

#[async_trait]
impl TypeRepository for MemoryStore {
    async fn list_types(&self) -> crate::Result<Vec<Type>> {
        let mut state = self.lock();
        state.record(StoreCall::ListTypes)?;

        Ok(state.types.values().cloned().collect())
    }

    async fn get_type(&self, type_id: i64) -> crate::Result<Type> {
        let mut state = self.lock();
        state.record(StoreCall::GetType { type_id })?;

        match state.types.get(&type_id) {
            Some(pokemon_type) => Ok(pokemon_type.clone()),
            None => not_found(format!("failed to fetch type {}", type_id)),
        }
    }

    async fn create_type(&self, new_type: &TypeRequest) -> crate::Result<Type> {
        let mut state = self.lock();
        state.record(StoreCall::CreateType { name: new_type.name.clone() })?;

        let pokemon_type = Type { id: state.next_id(Table::Types), name: new_type.name.clone() };
        state.types.insert(pokemon_type.id, pokemon_type.clone());

        Ok(pokemon_type)
    }

    async fn update_type(&self, type_id: i64, updated_type: &TypeRequest) -> crate::Result<Type> {
        let mut state = self.lock();
        state.record(StoreCall::UpdateType { type_id })?;

        match state.types.get_mut(&type_id) {
            Some(pokemon_type) => {
                pokemon_type.name = updated_type.name.clone();
                Ok(pokemon_type.clone())
            },
            None => not_found(format!("failed to update type {}", type_id)),
        }
    }

    async fn delete_type(&self, type_id: i64) -> crate::Result<()> {
        let mut state = self.lock();
        state.record(StoreCall::DeleteType { type_id })?;

        match state.types.remove(&type_id) {
            Some(_) => Ok(()),
            None => not_found(format!("failed to delete type {}", type_id)),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user_by_username(&self, username: &str) -> crate::Result<User> {
        let mut state = self.lock();
        state.record(StoreCall::GetUserByUsername { username: username.into() })?;

        match state.users.values().find(|user| user.username == username) {
            Some(user) => Ok(user.clone()),
            None => not_found(format!("failed to fetch user {}", username)),
        }
    }

    async fn create_user(&self, new_user: NewUser) -> crate::Result<i64> {
        let mut state = self.lock();
        state.record(StoreCall::CreateUser { username: new_user.username.clone() })?;

        if state.users.values().any(|user| user.username == new_user.username) {
            return Err(crate::Error::DuplicateUsername { username: new_user.username });
        }

        let id = state.next_id(Table::Users);
        state.users.insert(
            id,
            User {
                id,
                username: new_user.username,
                email: new_user.email,
                password_hash: new_user.password_hash,
                role: new_user.role,
            },
        );

        Ok(id)
    }
}
