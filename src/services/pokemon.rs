//! Service used to load and save pokemons along with their types. Used by the Pokedex REST API.

pub mod reconcile;

use std::sync::Arc;

use log::debug;

use crate::models::pokemon::{NewPokemon, Pokemon, PokemonDetail, PokemonRequest, PokemonSummary, CAUGHT};
use crate::repositories::{PokemonFilter, PokemonRepository, PokemonTypeRepository, Repositories};
use crate::services::pokemon::reconcile::{apply_type_changes, plan_type_changes};

/// Service implementation for pokemon entities.
///
/// Multi-step writes (pokemon row plus associations) are not transactional: a failure midway
/// leaves the steps already done in storage.
#[derive(Clone)]
pub struct Service {
    pokemons: Arc<dyn PokemonRepository>,
    pokemon_types: Arc<dyn PokemonTypeRepository>,
}

impl Service {
    /// Creates a new pokemon service using the provided storage accessors.
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            pokemons: repositories.pokemons.clone(),
            pokemon_types: repositories.pokemon_types.clone(),
        }
    }

    /// Lists pokemons, applying `filter` if it has any criterion.
    pub async fn list_pokemons(&self, filter: &PokemonFilter) -> crate::Result<Vec<PokemonSummary>> {
        let pokemons = if filter.is_empty() {
            self.pokemons.list_pokemons().await?
        } else {
            self.pokemons.list_pokemons_filtered(filter).await?
        };

        let mut summaries = Vec::with_capacity(pokemons.len());
        for pokemon in pokemons {
            let associations = self.pokemon_types.list_associations(pokemon.id).await?;
            summaries.push(PokemonSummary::build(pokemon, &associations)?);
        }

        Ok(summaries)
    }

    /// Returns the pokemon with the given ID.
    pub async fn get_pokemon(&self, pokemon_id: i64) -> crate::Result<PokemonDetail> {
        let pokemon = self.pokemons.get_pokemon(pokemon_id).await?;

        self.build_detail(pokemon).await
    }

    /// Creates a new pokemon, then associates it with the requested types in order.
    pub async fn create_pokemon(&self, request: &PokemonRequest) -> crate::Result<PokemonDetail> {
        let pokemon = self
            .pokemons
            .create_pokemon(&request.to_new_pokemon()?)
            .await?;
        debug!("Created pokemon {} ({})", pokemon.id, pokemon.name);

        for &type_id in &request.types {
            self.pokemon_types
                .create_association(pokemon.id, type_id)
                .await?;
        }

        self.build_detail(pokemon).await
    }

    /// Overwrites the pokemon with the given ID and converges its types to the requested list.
    ///
    /// See [`reconcile`] for how the type associations are updated.
    pub async fn update_pokemon(
        &self,
        pokemon_id: i64,
        request: &PokemonRequest,
    ) -> crate::Result<PokemonDetail> {
        self.pokemons
            .update_pokemon(pokemon_id, &request.to_new_pokemon()?)
            .await?;

        let persisted = self.pokemon_types.list_associations(pokemon_id).await?;
        let changes = plan_type_changes(&request.types, &persisted);
        debug!("Pokemon {}: {} type change(s) to apply", pokemon_id, changes.len());
        apply_type_changes(self.pokemon_types.as_ref(), pokemon_id, &changes).await?;

        self.get_pokemon(pokemon_id).await
    }

    /// Deletes the pokemon with the given ID, then all of its type associations.
    pub async fn delete_pokemon(&self, pokemon_id: i64) -> crate::Result<()> {
        self.pokemons.delete_pokemon(pokemon_id).await?;

        let deleted_count = self
            .pokemon_types
            .delete_associations_by_pokemon(pokemon_id)
            .await?;
        debug!("Deleted pokemon {} and {} type association(s)", pokemon_id, deleted_count);

        Ok(())
    }

    /// Marks the pokemon with the given ID as caught. Catching it again changes nothing.
    pub async fn catch_pokemon(&self, pokemon_id: i64) -> crate::Result<PokemonDetail> {
        let mut pokemon = self.pokemons.get_pokemon(pokemon_id).await?;

        if pokemon.caught != CAUGHT {
            pokemon.caught = CAUGHT;
            pokemon = self
                .pokemons
                .update_pokemon(pokemon_id, &NewPokemon::from(pokemon))
                .await?;
            debug!("Pokemon {} caught", pokemon_id);
        }

        self.build_detail(pokemon).await
    }

    async fn build_detail(&self, pokemon: Pokemon) -> crate::Result<PokemonDetail> {
        let associations = self.pokemon_types.list_associations(pokemon.id).await?;

        PokemonDetail::build(pokemon, &associations)
    }
}
