//! Postgres implementation of the storage accessors, using [`diesel_async`].

use async_trait::async_trait;
use diesel::result::DatabaseErrorKind;
use diesel::{delete, insert_into, update, ExpressionMethods, NotFound, QueryDsl, SelectableHelper};
use diesel::{JoinOnDsl, TextExpressionMethods};
use diesel_async::RunQueryDsl;
use log::trace;

use crate::db::{Pool, PooledConnection};
use crate::error::QueryContext;
use crate::models::pokemon::{NewPokemon, Pokemon};
use crate::models::pokemon_type::{NewPokemonTypeAssociation, PokemonTypeAssociation};
use crate::models::types::{Type, TypeRequest};
use crate::models::user::{NewUser, User};
use crate::repositories::{
    PokemonFilter, PokemonRepository, PokemonSort, PokemonTypeRepository, SortColumn, SortOrder,
    TypeRepository, UserRepository,
};
use crate::schema::{pokemon_types, pokemons, types, users};

/// Storage accessors backed by a Postgres connection [`Pool`].
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Creates a store using the provided database connection [`Pool`].
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Returns a [`PooledConnection`] from our internal database connection pool.
    async fn get_pooled_connection(&self) -> crate::Result<PooledConnection> {
        Ok(self.pool.get().await?)
    }
}

/// Escapes `LIKE` wildcards so that `value` is matched literally.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Maps a row count to [`NotFound`] when nothing was touched.
fn require_rows(count: usize) -> diesel::QueryResult<()> {
    if count > 0 {
        Ok(())
    } else {
        Err(NotFound)
    }
}

#[async_trait]
impl PokemonRepository for PgStore {
    async fn get_pokemon(&self, pokemon_id: i64) -> crate::Result<Pokemon> {
        let mut connection = self.get_pooled_connection().await?;

        pokemons::table
            .find(pokemon_id)
            .select(Pokemon::as_select())
            .first(&mut connection)
            .await
            .with_query_context(|| format!("failed to fetch pokemon {}", pokemon_id))
    }

    async fn list_pokemons(&self) -> crate::Result<Vec<Pokemon>> {
        let mut connection = self.get_pooled_connection().await?;

        pokemons::table
            .order(pokemons::id)
            .select(Pokemon::as_select())
            .load(&mut connection)
            .await
            .with_query_context(|| "failed to list pokemons")
    }

    async fn list_pokemons_filtered(&self, filter: &PokemonFilter) -> crate::Result<Vec<Pokemon>> {
        let mut connection = self.get_pooled_connection().await?;

        let mut query = pokemons::table.select(Pokemon::as_select()).into_boxed();

        if let Some(name) = &filter.name {
            query = query.filter(pokemons::name.like(like_pattern(name)));
        }
        if let Some(caught) = filter.caught {
            query = query.filter(pokemons::caught.eq(caught));
        }
        if !filter.type_ids.is_empty() {
            // Membership through a subselect keeps a single row per pokemon.
            query = query.filter(
                pokemons::id.eq_any(
                    pokemon_types::table
                        .filter(pokemon_types::type_id.eq_any(filter.type_ids.clone()))
                        .select(pokemon_types::pokemon_id),
                ),
            );
        }

        query = match filter.sort {
            None => query.order(pokemons::id.asc()),
            Some(PokemonSort { column, order }) => match (column, order) {
                (SortColumn::Id, SortOrder::Asc) => query.order(pokemons::id.asc()),
                (SortColumn::Id, SortOrder::Desc) => query.order(pokemons::id.desc()),
                (SortColumn::Name, SortOrder::Asc) => query.order(pokemons::name.asc()),
                (SortColumn::Name, SortOrder::Desc) => query.order(pokemons::name.desc()),
                (SortColumn::Species, SortOrder::Asc) => query.order(pokemons::species.asc()),
                (SortColumn::Species, SortOrder::Desc) => query.order(pokemons::species.desc()),
                (SortColumn::Caught, SortOrder::Asc) => query.order(pokemons::caught.asc()),
                (SortColumn::Caught, SortOrder::Desc) => query.order(pokemons::caught.desc()),
            }
            .then_order_by(pokemons::id.asc()),
        };
        trace!("Listing pokemons with filter {:?}", filter);

        query
            .load(&mut connection)
            .await
            .with_query_context(|| "failed to list pokemons with filter")
    }

    async fn create_pokemon(&self, new_pokemon: &NewPokemon) -> crate::Result<Pokemon> {
        let mut connection = self.get_pooled_connection().await?;

        insert_into(pokemons::table)
            .values(new_pokemon)
            .returning(Pokemon::as_returning())
            .get_result(&mut connection)
            .await
            .with_query_context(|| "failed to insert new pokemon")
    }

    async fn update_pokemon(
        &self,
        pokemon_id: i64,
        pokemon: &NewPokemon,
    ) -> crate::Result<Pokemon> {
        let mut connection = self.get_pooled_connection().await?;

        update(pokemons::table.find(pokemon_id))
            .set(pokemon)
            .returning(Pokemon::as_returning())
            .get_result(&mut connection)
            .await
            .with_query_context(|| format!("failed to update pokemon {}", pokemon_id))
    }

    async fn delete_pokemon(&self, pokemon_id: i64) -> crate::Result<()> {
        let mut connection = self.get_pooled_connection().await?;

        delete(pokemons::table.find(pokemon_id))
            .execute(&mut connection)
            .await
            .and_then(require_rows)
            .with_query_context(|| format!("failed to delete pokemon {}", pokemon_id))
    }
}

#[async_trait]
impl PokemonTypeRepository for PgStore {
    async fn list_associations(&self, pokemon_id: i64) -> crate::Result<Vec<PokemonTypeAssociation>> {
        let mut connection = self.get_pooled_connection().await?;

        pokemon_types::table
            .inner_join(types::table.on(types::id.eq(pokemon_types::type_id)))
            .filter(pokemon_types::pokemon_id.eq(pokemon_id))
            .order(pokemon_types::id)
            .select((
                pokemon_types::id,
                pokemon_types::pokemon_id,
                pokemon_types::type_id,
                types::name,
            ))
            .load(&mut connection)
            .await
            .with_query_context(|| format!("failed to list types of pokemon {}", pokemon_id))
    }

    async fn create_association(&self, pokemon_id: i64, type_id: i64) -> crate::Result<i64> {
        let mut connection = self.get_pooled_connection().await?;

        insert_into(pokemon_types::table)
            .values(NewPokemonTypeAssociation { pokemon_id, type_id })
            .returning(pokemon_types::id)
            .get_result(&mut connection)
            .await
            .with_query_context(|| {
                format!("failed to add type {} to pokemon {}", type_id, pokemon_id)
            })
    }

    async fn update_association(
        &self,
        association_id: i64,
        pokemon_id: i64,
        type_id: i64,
    ) -> crate::Result<()> {
        let mut connection = self.get_pooled_connection().await?;

        update(pokemon_types::table.find(association_id))
            .set(NewPokemonTypeAssociation { pokemon_id, type_id })
            .execute(&mut connection)
            .await
            .and_then(require_rows)
            .with_query_context(|| format!("failed to update pokemon type {}", association_id))
    }

    async fn delete_associations_by_pokemon(&self, pokemon_id: i64) -> crate::Result<usize> {
        let mut connection = self.get_pooled_connection().await?;

        delete(pokemon_types::table.filter(pokemon_types::pokemon_id.eq(pokemon_id)))
            .execute(&mut connection)
            .await
            .with_query_context(|| format!("failed to delete types of pokemon {}", pokemon_id))
    }

    async fn delete_association(&self, association_id: i64) -> crate::Result<()> {
        let mut connection = self.get_pooled_connection().await?;

        delete(pokemon_types::table.find(association_id))
            .execute(&mut connection)
            .await
            .and_then(require_rows)
            .with_query_context(|| format!("failed to delete pokemon type {}", association_id))
    }
}

#[async_trait]
impl TypeRepository for PgStore {
    async fn list_types(&self) -> crate::Result<Vec<Type>> {
        let mut connection = self.get_pooled_connection().await?;

        types::table
            .order(types::id)
            .select(Type::as_select())
            .load(&mut connection)
            .await
            .with_query_context(|| "failed to list types")
    }

    async fn get_type(&self, type_id: i64) -> crate::Result<Type> {
        let mut connection = self.get_pooled_connection().await?;

        types::table
            .find(type_id)
            .select(Type::as_select())
            .first(&mut connection)
            .await
            .with_query_context(|| format!("failed to fetch type {}", type_id))
    }

    async fn create_type(&self, new_type: &TypeRequest) -> crate::Result<Type> {
        let mut connection = self.get_pooled_connection().await?;

        insert_into(types::table)
            .values(new_type)
            .returning(Type::as_returning())
            .get_result(&mut connection)
            .await
            .with_query_context(|| "failed to insert new type")
    }

    async fn update_type(&self, type_id: i64, updated_type: &TypeRequest) -> crate::Result<Type> {
        let mut connection = self.get_pooled_connection().await?;

        update(types::table.find(type_id))
            .set(updated_type)
            .returning(Type::as_returning())
            .get_result(&mut connection)
            .await
            .with_query_context(|| format!("failed to update type {}", type_id))
    }

    async fn delete_type(&self, type_id: i64) -> crate::Result<()> {
        let mut connection = self.get_pooled_connection().await?;

        delete(types::table.find(type_id))
            .execute(&mut connection)
            .await
            .and_then(require_rows)
            .with_query_context(|| format!("failed to delete type {}", type_id))
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn get_user_by_username(&self, username: &str) -> crate::Result<User> {
        let mut connection = self.get_pooled_connection().await?;

        users::table
            .filter(users::username.eq(username))
            .first::<User>(&mut connection)
            .await
            .with_query_context(|| format!("failed to fetch user {}", username))
    }

    async fn create_user(&self, new_user: NewUser) -> crate::Result<i64> {
        let mut connection = self.get_pooled_connection().await?;
        let username = new_user.username.clone();

        let result: diesel::QueryResult<i64> = insert_into(users::table)
            .values(new_user)
            .returning(users::id)
            .get_result(&mut connection)
            .await;

        match result {
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(crate::Error::DuplicateUsername { username })
            },
            result => result.with_query_context(|| format!("failed to insert user {}", username)),
        }
    }
}
