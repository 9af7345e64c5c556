use actix_web::http::StatusCode;
use actix_web::test;
use pokedex::auth::Role;
use pokedex::models::pokemon::{PokemonDetail, PokemonSummary, CAUGHT, NOT_CAUGHT};
use pokedex::repositories::memory::StoreOperation;

use crate::init_test_service;
use crate::integration_helpers::factories::pokemon::{build_pokemon_request, TYPE_NAMES};

mod list {
    use super::*;

    macro_rules! list_names {
        ($service:expr, $uri:expr) => {{
            let req = test::TestRequest::with_uri($uri).to_request();
            let pokemons: Vec<PokemonSummary> = test::call_and_read_body_json($service, req).await;

            pokemons.into_iter().map(|pokemon| pokemon.name).collect::<Vec<_>>()
        }};
    }

    #[test_log::test(actix_web::test)]
    async fn test_empty_list() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/pokedex/pokemons").to_request();
        let pokemons: Vec<PokemonSummary> = test::call_and_read_body_json(&service, req).await;

        assert!(pokemons.is_empty());
        assert_eq!(1, app.store().count(StoreOperation::ListPokemons));
    }

    #[test_log::test(actix_web::test)]
    async fn test_summaries() {
        init_test_service!(app, service);
        app.seed_types(&TYPE_NAMES).await;
        app.seed_pokemon(&build_pokemon_request("Bulbasaur", vec![1, 2])).await;

        let req = test::TestRequest::with_uri("/pokedex/pokemons").to_request();
        let pokemons: Vec<PokemonSummary> = test::call_and_read_body_json(&service, req).await;

        assert_eq!(
            vec![PokemonSummary {
                id: 1,
                name: "Bulbasaur".into(),
                species: "Bulbasaur species".into(),
                types: vec!["Grass".into(), "Poison".into()],
                caught: NOT_CAUGHT,
                image_url: "https://img.example.com/bulbasaur.png".into(),
            }],
            pokemons
        );
    }

    #[test_log::test(actix_web::test)]
    async fn test_filters() {
        init_test_service!(app, service);
        app.seed_types(&TYPE_NAMES).await;
        app.seed_pokemon(&build_pokemon_request("Bulbasaur", vec![1, 2])).await;
        app.seed_pokemon(&build_pokemon_request("Charmander", vec![3])).await;
        app.seed_pokemon(&build_pokemon_request("Squirtle", vec![4])).await;
        app.seed_pokemon(&build_pokemon_request("Missingno", vec![])).await;
        let mut pikachu = build_pokemon_request("Pikachu", vec![5]);
        pikachu.caught = CAUGHT;
        app.seed_pokemon(&pikachu).await;

        assert_eq!(
            vec!["Bulbasaur", "Charmander", "Squirtle", "Missingno", "Pikachu"],
            list_names!(&service, "/pokedex/pokemons")
        );
        assert_eq!(vec!["Charmander"], list_names!(&service, "/pokedex/pokemons?name=arm"));
        assert_eq!(vec!["Pikachu"], list_names!(&service, "/pokedex/pokemons?options=1"));
        assert_eq!(
            vec!["Bulbasaur", "Squirtle"],
            list_names!(&service, "/pokedex/pokemons?type=2,4")
        );
        assert_eq!(
            vec!["Squirtle", "Pikachu", "Missingno", "Charmander", "Bulbasaur"],
            list_names!(&service, "/pokedex/pokemons?sort_by=name&order_by=desc")
        );
        assert_eq!(
            vec!["Bulbasaur", "Charmander", "Missingno", "Pikachu", "Squirtle"],
            list_names!(&service, "/pokedex/pokemons?sort_by=name")
        );
        assert_eq!(
            vec!["Squirtle", "Charmander"],
            list_names!(&service, "/pokedex/pokemons?options=0&type=3,4&sort_by=species&order_by=desc")
        );
        assert_eq!(
            vec!["Bulbasaur", "Charmander", "Squirtle", "Missingno", "Pikachu"],
            list_names!(&service, "/pokedex/pokemons?foo=bar")
        );
    }

    #[test_log::test(actix_web::test)]
    async fn test_invalid_query_param_values() {
        init_test_service!(app, service);

        for uri in [
            "/pokedex/pokemons?options=2",
            "/pokedex/pokemons?options=yes",
            "/pokedex/pokemons?type=grass",
            "/pokedex/pokemons?sort_by=weight",
            "/pokedex/pokemons?sort_by=name&order_by=sideways",
        ] {
            let req = test::TestRequest::with_uri(uri).to_request();
            let res = test::call_service(&service, req).await;

            assert_eq!(StatusCode::BAD_REQUEST, res.status(), "uri: {}", uri);
        }
        assert!(app.store().calls().is_empty());
    }

    #[test_log::test(actix_web::test)]
    async fn test_broken_storage() {
        init_test_service!(app, service);
        app.store().fail_next(StoreOperation::ListPokemons);

        let req = test::TestRequest::with_uri("/pokedex/pokemons").to_request();
        let res = test::call_service(&service, req).await;

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    }

    #[test_log::test(actix_web::test)]
    async fn test_internal_list_requires_admin() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/internal/pokedex/pokemons")
            .cookie(app.session_cookie(Role::User))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::FORBIDDEN, res.status());

        let req = test::TestRequest::with_uri("/internal/pokedex/pokemons")
            .cookie(app.session_cookie(Role::Admin))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::OK, res.status());
    }
}

mod get {
    use super::*;

    #[test_log::test(actix_web::test)]
    async fn test_get() {
        init_test_service!(app, service);
        app.seed_types(&TYPE_NAMES).await;
        let expected = app
            .seed_pokemon(&build_pokemon_request("Bulbasaur", vec![1, 2]))
            .await;

        let req = test::TestRequest::with_uri(&format!("/pokedex/pokemons/{}", expected.id))
            .to_request();
        let actual: PokemonDetail = test::call_and_read_body_json(&service, req).await;

        assert_eq!(expected, actual);
        assert_eq!(vec!["Grass", "Poison"], actual.types);
        assert_eq!(49, actual.metadata.stats.defense);
    }

    #[test_log::test(actix_web::test)]
    async fn test_flat_json() {
        init_test_service!(app, service);
        app.seed_pokemon(&build_pokemon_request("Bulbasaur", vec![])).await;

        let req = test::TestRequest::with_uri("/pokedex/pokemons/1").to_request();
        let json: serde_json::Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!("https://img.example.com/bulbasaur.png", json["image_url"]);
        assert_eq!(6.9, json["weight"]);
        assert_eq!(45, json["stats"]["hp"]);
        assert!(json.get("metadata").is_none());
    }

    #[test_log::test(actix_web::test)]
    async fn test_not_found() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/pokedex/pokemons/42").to_request();
        let res = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, res.status());
    }

    #[test_log::test(actix_web::test)]
    async fn test_invalid_id() {
        init_test_service!(app, service);

        for uri in ["/pokedex/pokemons/0", "/pokedex/pokemons/pikachu"] {
            let req = test::TestRequest::with_uri(uri).to_request();
            let res = test::call_service(&service, req).await;

            assert_eq!(StatusCode::BAD_REQUEST, res.status(), "uri: {}", uri);
        }
    }
}

mod create {
    use super::*;

    #[test_log::test(actix_web::test)]
    async fn test_create() {
        init_test_service!(app, service);
        app.seed_types(&TYPE_NAMES).await;

        let req = test::TestRequest::post()
            .uri("/internal/pokedex/pokemons")
            .cookie(app.session_cookie(Role::Admin))
            .set_json(build_pokemon_request("Bulbasaur", vec![1, 2, 3]))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::CREATED, res.status());

        let created: PokemonDetail = test::read_body_json(res).await;
        assert_eq!("Bulbasaur", created.name);
        assert_eq!(vec!["Grass", "Poison", "Fire"], created.types);
        assert_eq!(1, app.store().count(StoreOperation::CreatePokemon));
        assert_eq!(3, app.store().count(StoreOperation::CreateAssociation));
    }

    #[test_log::test(actix_web::test)]
    async fn test_legacy_field_names() {
        init_test_service!(app, service);

        let req = test::TestRequest::post()
            .uri("/internal/pokedex/pokemons")
            .cookie(app.session_cookie(Role::Admin))
            .set_json(serde_json::json!({
                "name": "Pikachu",
                "catched": 1,
                "stats": { "hp": 35, "def": 40 },
            }))
            .to_request();
        let created: PokemonDetail = test::call_and_read_body_json(&service, req).await;

        assert_eq!(CAUGHT, created.caught);
        assert_eq!(40, created.metadata.stats.defense);
        assert!(created.types.is_empty());
    }

    #[test_log::test(actix_web::test)]
    async fn test_invalid_body() {
        init_test_service!(app, service);

        let mut bad_caught = build_pokemon_request("Bulbasaur", vec![1]);
        bad_caught.caught = 2;
        let mut bad_type = build_pokemon_request("Bulbasaur", vec![1]);
        bad_type.types = vec![1, 0];
        let mut no_name = build_pokemon_request("Bulbasaur", vec![1]);
        no_name.name = String::new();

        for body in [bad_caught, bad_type, no_name] {
            let req = test::TestRequest::post()
                .uri("/internal/pokedex/pokemons")
                .cookie(app.session_cookie(Role::Admin))
                .set_json(&body)
                .to_request();
            let res = test::call_service(&service, req).await;

            assert_eq!(StatusCode::BAD_REQUEST, res.status(), "body: {:?}", body);
        }
        assert_eq!(0, app.store().count(StoreOperation::CreatePokemon));
    }

    #[test_log::test(actix_web::test)]
    async fn test_role_gate() {
        init_test_service!(app, service);

        let req = test::TestRequest::post()
            .uri("/internal/pokedex/pokemons")
            .set_json(build_pokemon_request("Bulbasaur", vec![]))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNAUTHORIZED, res.status());

        let req = test::TestRequest::post()
            .uri("/internal/pokedex/pokemons")
            .cookie(app.session_cookie(Role::User))
            .set_json(build_pokemon_request("Bulbasaur", vec![]))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::FORBIDDEN, res.status());

        let req = test::TestRequest::post()
            .uri("/internal/pokedex/pokemons")
            .cookie(actix_web::cookie::Cookie::new("token", "not-a-token"))
            .set_json(build_pokemon_request("Bulbasaur", vec![]))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNAUTHORIZED, res.status());

        assert!(app.store().calls().is_empty());
    }
}

mod update {
    use super::*;

    #[test_log::test(actix_web::test)]
    async fn test_shrink_types() {
        init_test_service!(app, service);
        app.seed_types(&TYPE_NAMES).await;
        let pokemon = app
            .seed_pokemon(&build_pokemon_request("Bulbasaur", vec![1, 2, 3]))
            .await;

        let mut request = build_pokemon_request("Ivysaur", vec![2, 5]);
        request.metadata.weight = 13.0;
        let req = test::TestRequest::put()
            .uri(&format!("/internal/pokedex/pokemons/{}", pokemon.id))
            .cookie(app.session_cookie(Role::Admin))
            .set_json(&request)
            .to_request();
        let updated: PokemonDetail = test::call_and_read_body_json(&service, req).await;

        assert_eq!("Ivysaur", updated.name);
        assert_eq!(13.0, updated.metadata.weight);
        assert_eq!(vec!["Poison", "Electric"], updated.types);
        assert_eq!(1, app.store().count(StoreOperation::UpdatePokemon));
        assert_eq!(3, app.store().count(StoreOperation::UpdateAssociation));
        assert_eq!(0, app.store().count(StoreOperation::CreateAssociation));
        assert_eq!(vec![(1, 2), (2, 5), (3, 0)], app.store().raw_associations(pokemon.id));
    }

    #[test_log::test(actix_web::test)]
    async fn test_same_types() {
        init_test_service!(app, service);
        app.seed_types(&TYPE_NAMES).await;
        let pokemon = app
            .seed_pokemon(&build_pokemon_request("Bulbasaur", vec![1, 2]))
            .await;

        let req = test::TestRequest::put()
            .uri(&format!("/internal/pokedex/pokemons/{}", pokemon.id))
            .cookie(app.session_cookie(Role::Admin))
            .set_json(build_pokemon_request("Bulbasaur", vec![1, 2]))
            .to_request();
        let updated: PokemonDetail = test::call_and_read_body_json(&service, req).await;

        assert_eq!(pokemon, updated);
        assert_eq!(0, app.store().count(StoreOperation::UpdateAssociation));
        assert_eq!(0, app.store().count(StoreOperation::CreateAssociation));
    }

    #[test_log::test(actix_web::test)]
    async fn test_not_found() {
        init_test_service!(app, service);

        let req = test::TestRequest::put()
            .uri("/internal/pokedex/pokemons/42")
            .cookie(app.session_cookie(Role::Admin))
            .set_json(build_pokemon_request("Bulbasaur", vec![]))
            .to_request();
        let res = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, res.status());
    }
}

mod delete {
    use super::*;

    #[test_log::test(actix_web::test)]
    async fn test_delete() {
        init_test_service!(app, service);
        app.seed_types(&TYPE_NAMES).await;
        let pokemon = app
            .seed_pokemon(&build_pokemon_request("Bulbasaur", vec![1, 2]))
            .await;

        let req = test::TestRequest::delete()
            .uri(&format!("/internal/pokedex/pokemons/{}", pokemon.id))
            .cookie(app.session_cookie(Role::Admin))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::NO_CONTENT, res.status());
        assert!(app.store().raw_associations(pokemon.id).is_empty());

        let req = test::TestRequest::with_uri(&format!("/pokedex/pokemons/{}", pokemon.id))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::NOT_FOUND, res.status());
    }

    #[test_log::test(actix_web::test)]
    async fn test_not_found() {
        init_test_service!(app, service);

        let req = test::TestRequest::delete()
            .uri("/internal/pokedex/pokemons/42")
            .cookie(app.session_cookie(Role::Admin))
            .to_request();
        let res = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, res.status());
        assert_eq!(0, app.store().count(StoreOperation::DeleteAssociationsByPokemon));
    }
}

mod catch {
    use pokedex::auth::session::SESSION_COOKIE;
    use time::{Duration, OffsetDateTime};

    use super::*;

    #[test_log::test(actix_web::test)]
    async fn test_catch() {
        init_test_service!(app, service);
        let pokemon = app.seed_pokemon(&build_pokemon_request("Pikachu", vec![])).await;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri(&format!("/user/pokedex/pokemons/{}/catch", pokemon.id))
                .cookie(app.session_cookie(Role::User))
                .to_request();
            let caught: PokemonDetail = test::call_and_read_body_json(&service, req).await;

            assert_eq!(CAUGHT, caught.caught);
            assert_eq!(pokemon.metadata, caught.metadata);
        }
        assert_eq!(1, app.store().count(StoreOperation::UpdatePokemon));
    }

    #[test_log::test(actix_web::test)]
    async fn test_admin_can_catch() {
        init_test_service!(app, service);
        let pokemon = app.seed_pokemon(&build_pokemon_request("Pikachu", vec![])).await;

        let req = test::TestRequest::post()
            .uri(&format!("/user/pokedex/pokemons/{}/catch", pokemon.id))
            .cookie(app.session_cookie(Role::Admin))
            .to_request();
        let res = test::call_service(&service, req).await;

        assert_eq!(StatusCode::OK, res.status());
    }

    #[test_log::test(actix_web::test)]
    async fn test_session_required() {
        init_test_service!(app, service);
        let pokemon = app.seed_pokemon(&build_pokemon_request("Pikachu", vec![])).await;
        let uri = format!("/user/pokedex/pokemons/{}/catch", pokemon.id);

        let req = test::TestRequest::post().uri(&uri).to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNAUTHORIZED, res.status());

        let req = test::TestRequest::post()
            .uri(&uri)
            .cookie(app.session_cookie(Role::Public))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::FORBIDDEN, res.status());

        let expired_token = app
            .session_keys()
            .issue_at("ash", "", Role::User, OffsetDateTime::now_utc() - Duration::hours(2))
            .unwrap();
        let req = test::TestRequest::post()
            .uri(&uri)
            .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, expired_token))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNAUTHORIZED, res.status());

        assert_eq!(0, app.store().count(StoreOperation::UpdatePokemon));
    }

    #[test_log::test(actix_web::test)]
    async fn test_not_found() {
        init_test_service!(app, service);

        let req = test::TestRequest::post()
            .uri("/user/pokedex/pokemons/42/catch")
            .cookie(app.session_cookie(Role::User))
            .to_request();
        let res = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, res.status());
    }
}
