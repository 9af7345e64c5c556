//! Tests of the Postgres store, run against `TEST_DATABASE_URL`.

use pokedex::models::types::{Type, TypeRequest};
use pokedex::repositories::TypeRepository;

use crate::integration_helpers::db::TestDb;

/// Id that no sequence will reach during a test run.
const MISSING_ID: i64 = i64::MAX;

async fn seed_types(db: &TestDb, names: &[&str]) -> Vec<Type> {
    let store = db.store();

    let mut types = Vec::with_capacity(names.len());
    for name in names {
        types.push(store.create_type(&TypeRequest { name: (*name).into() }).await.unwrap());
    }
    types
}

mod pokemons {
    use diesel::{ExpressionMethods, QueryDsl};
    use diesel_async::RunQueryDsl;
    use pokedex::models::pokemon::{Pokemon, CAUGHT};
    use pokedex::models::pokemon_type::DELETED_TYPE_ID;
    use pokedex::repositories::{
        PokemonFilter, PokemonRepository, PokemonSort, PokemonTypeRepository, SortColumn,
        SortOrder,
    };
    use pokedex::schema::pokemon_types;
    use pokedex::services::pokemon;
    use serial_test::file_serial;

    use super::*;
    use crate::init_test_db;
    use crate::integration_helpers::factories::pokemon::{build_pokemon_request, TYPE_NAMES};

    /// Raw `(id, type_id)` rows of a pokemon's associations, sentinel rows included.
    async fn association_rows(db: &TestDb, pokemon_id: i64) -> Vec<(i64, i64)> {
        let mut connection = db.get_pooled_connection().await;

        pokemon_types::table
            .filter(pokemon_types::pokemon_id.eq(pokemon_id))
            .order(pokemon_types::id)
            .select((pokemon_types::id, pokemon_types::type_id))
            .load(&mut connection)
            .await
            .unwrap()
    }

    fn names(pokemons: Vec<Pokemon>) -> Vec<String> {
        pokemons.into_iter().map(|pokemon| pokemon.name).collect()
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(test_db)]
    async fn test_type_updates_reuse_rows() {
        init_test_db!(db);
        let type_ids: Vec<i64> = seed_types(&db, &TYPE_NAMES)
            .await
            .into_iter()
            .map(|t| t.id)
            .collect();
        let service = pokemon::Service::new(&db.repositories());

        let created = service
            .create_pokemon(&build_pokemon_request("Bulbasaur", type_ids[..3].to_vec()))
            .await
            .unwrap();
        assert_eq!(vec!["Grass", "Poison", "Fire"], created.types);

        let rows = association_rows(&db, created.id).await;
        assert_eq!(
            vec![type_ids[0], type_ids[1], type_ids[2]],
            rows.iter().map(|&(_, type_id)| type_id).collect::<Vec<_>>()
        );

        let updated = service
            .update_pokemon(
                created.id,
                &build_pokemon_request("Bulbasaur", vec![type_ids[1], type_ids[4]]),
            )
            .await
            .unwrap();
        assert_eq!(vec!["Poison", "Electric"], updated.types);

        // Same rows, repointed in place; the surplus one is kept with the sentinel.
        assert_eq!(
            vec![(rows[0].0, type_ids[1]), (rows[1].0, type_ids[4]), (rows[2].0, DELETED_TYPE_ID)],
            association_rows(&db, created.id).await
        );

        let visible = db.store().list_associations(created.id).await.unwrap();
        assert_eq!(
            vec![rows[0].0, rows[1].0],
            visible.iter().map(|association| association.id).collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["Poison", "Electric"],
            visible.iter().map(|association| association.name.as_str()).collect::<Vec<_>>()
        );

        let regrown = service
            .update_pokemon(
                created.id,
                &build_pokemon_request("Bulbasaur", vec![type_ids[1], type_ids[4], type_ids[3]]),
            )
            .await
            .unwrap();
        assert_eq!(vec!["Poison", "Electric", "Water"], regrown.types);

        // Sentinel rows are not visible, so growing again adds a row instead of reviving one.
        let regrown_rows = association_rows(&db, created.id).await;
        assert_eq!(4, regrown_rows.len());
        assert_eq!((rows[2].0, DELETED_TYPE_ID), regrown_rows[2]);
        assert!(regrown_rows[3].0 > rows[2].0);
        assert_eq!(type_ids[3], regrown_rows[3].1);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(test_db)]
    async fn test_delete_removes_associations() {
        init_test_db!(db);
        let types = seed_types(&db, &TYPE_NAMES[..2]).await;
        let service = pokemon::Service::new(&db.repositories());

        let pokemon = service
            .create_pokemon(&build_pokemon_request("Oddish", vec![types[0].id, types[1].id]))
            .await
            .unwrap();
        service.delete_pokemon(pokemon.id).await.unwrap();

        assert!(association_rows(&db, pokemon.id).await.is_empty());
        assert!(service.get_pokemon(pokemon.id).await.unwrap_err().is_not_found());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(test_db)]
    async fn test_filtering() {
        init_test_db!(db);
        let types = seed_types(&db, &TYPE_NAMES).await;
        let (grass, poison, fire, water) = (types[0].id, types[1].id, types[2].id, types[3].id);
        let service = pokemon::Service::new(&db.repositories());

        service
            .create_pokemon(&build_pokemon_request("Bulbasaur", vec![grass, poison]))
            .await
            .unwrap();
        let mut charmander = build_pokemon_request("Charmander", vec![fire]);
        charmander.caught = CAUGHT;
        service.create_pokemon(&charmander).await.unwrap();
        let mut wildcards = build_pokemon_request("Psyduck", vec![water]);
        wildcards.name = "100%_Sure".into();
        service.create_pokemon(&wildcards).await.unwrap();
        service
            .create_pokemon(&build_pokemon_request("1000 Sure", vec![]))
            .await
            .unwrap();

        let store = db.store();
        let list = |filter: PokemonFilter| {
            let store = store.clone();
            async move { names(store.list_pokemons_filtered(&filter).await.unwrap()) }
        };

        assert_eq!(
            vec!["Bulbasaur"],
            list(PokemonFilter { name: Some("saur".into()), ..PokemonFilter::default() }).await
        );
        assert_eq!(
            vec!["100%_Sure"],
            list(PokemonFilter { name: Some("0%_S".into()), ..PokemonFilter::default() }).await
        );
        assert_eq!(
            Vec::<String>::new(),
            list(PokemonFilter { name: Some("SAUR".into()), ..PokemonFilter::default() }).await
        );
        assert_eq!(
            vec!["Charmander"],
            list(PokemonFilter { caught: Some(CAUGHT), ..PokemonFilter::default() }).await
        );
        assert_eq!(
            vec!["Bulbasaur"],
            list(PokemonFilter { type_ids: vec![grass, poison], ..PokemonFilter::default() })
                .await
        );
        assert_eq!(
            vec!["Bulbasaur"],
            list(PokemonFilter {
                name: Some("a".into()),
                caught: Some(0),
                type_ids: vec![grass, fire, water],
                ..PokemonFilter::default()
            })
            .await
        );
        assert_eq!(
            vec!["Charmander", "Bulbasaur"],
            list(PokemonFilter {
                type_ids: vec![grass, fire],
                sort: Some(PokemonSort { column: SortColumn::Name, order: SortOrder::Desc }),
                ..PokemonFilter::default()
            })
            .await
        );
        assert_eq!(
            vec!["Charmander", "Bulbasaur", "100%_Sure", "1000 Sure"],
            list(PokemonFilter {
                sort: Some(PokemonSort { column: SortColumn::Caught, order: SortOrder::Desc }),
                ..PokemonFilter::default()
            })
            .await
        );
        assert_eq!(
            vec!["1000 Sure", "100%_Sure", "Charmander", "Bulbasaur"],
            list(PokemonFilter {
                sort: Some(PokemonSort { column: SortColumn::Id, order: SortOrder::Desc }),
                ..PokemonFilter::default()
            })
            .await
        );
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(test_db)]
    async fn test_missing_rows() {
        init_test_db!(db);
        let types = seed_types(&db, &TYPE_NAMES[..1]).await;
        let store = db.store();
        let pokemon = store
            .create_pokemon(&build_pokemon_request("Pikachu", vec![]).to_new_pokemon().unwrap())
            .await
            .unwrap();

        assert!(store.get_pokemon(MISSING_ID).await.unwrap_err().is_not_found());
        assert!(store
            .update_pokemon(MISSING_ID, &pokemon.clone().into())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.delete_pokemon(MISSING_ID).await.unwrap_err().is_not_found());
        assert!(store
            .update_association(MISSING_ID, pokemon.id, types[0].id)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.delete_association(MISSING_ID).await.unwrap_err().is_not_found());
        assert_eq!(0, store.delete_associations_by_pokemon(pokemon.id).await.unwrap());
    }
}

mod types {
    use serial_test::file_serial;

    use super::*;
    use crate::init_test_db;
    use crate::integration_helpers::factories::pokemon::TYPE_NAMES;

    #[test_log::test(actix_web::test)]
    #[file_serial(test_db)]
    async fn test_crud() {
        init_test_db!(db);
        let seeded = seed_types(&db, &TYPE_NAMES).await;
        let store = db.store();

        assert_eq!(seeded, store.list_types().await.unwrap());
        assert_eq!(seeded[2], store.get_type(seeded[2].id).await.unwrap());

        let renamed = store
            .update_type(seeded[2].id, &TypeRequest { name: "Flame".into() })
            .await
            .unwrap();
        assert_eq!(Type { id: seeded[2].id, name: "Flame".into() }, renamed);

        store.delete_type(seeded[2].id).await.unwrap();
        assert_eq!(TYPE_NAMES.len() - 1, store.list_types().await.unwrap().len());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(test_db)]
    async fn test_missing_rows() {
        init_test_db!(db);
        let store = db.store();

        assert!(store.get_type(MISSING_ID).await.unwrap_err().is_not_found());
        assert!(store
            .update_type(MISSING_ID, &TypeRequest { name: "Ghost".into() })
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.delete_type(MISSING_ID).await.unwrap_err().is_not_found());
    }
}

mod users {
    use assert_matches::assert_matches;
    use pokedex::auth::Role;
    use pokedex::models::user::NewUser;
    use pokedex::repositories::UserRepository;
    use pokedex::Error;
    use serial_test::file_serial;

    use super::*;
    use crate::init_test_db;

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.into(),
            email: format!("{}@pallet.town", username),
            password_hash: "not-a-real-hash".into(),
            role,
        }
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(test_db)]
    async fn test_create_and_fetch() {
        init_test_db!(db);
        let store = db.store();

        let user_id = store.create_user(new_user("ash", Role::Admin)).await.unwrap();
        let user = store.get_user_by_username("ash").await.unwrap();

        assert_eq!(user_id, user.id);
        assert_eq!("ash@pallet.town", user.email);
        assert_eq!(Role::Admin, user.role);
        assert!(store.get_user_by_username("Ash").await.unwrap_err().is_not_found());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(test_db)]
    async fn test_duplicate_username() {
        init_test_db!(db);
        let store = db.store();

        store.create_user(new_user("misty", Role::User)).await.unwrap();

        assert_matches!(
            store.create_user(new_user("misty", Role::Admin)).await,
            Err(Error::DuplicateUsername { username }) if username == "misty"
        );
        assert_eq!(Role::User, store.get_user_by_username("misty").await.unwrap().role);
    }
}
