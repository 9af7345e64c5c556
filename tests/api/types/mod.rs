use actix_web::http::StatusCode;
use actix_web::test;
use pokedex::auth::Role;
use pokedex::models::pokemon::PokemonDetail;
use pokedex::models::types::Type;
use pokedex::repositories::memory::StoreOperation;
use serde_json::json;

use crate::init_test_service;
use crate::integration_helpers::factories::pokemon::{build_pokemon_request, TYPE_NAMES};

#[test_log::test(actix_web::test)]
async fn test_public_list() {
    init_test_service!(app, service);
    let expected = app.seed_types(&TYPE_NAMES).await;

    let req = test::TestRequest::with_uri("/pokedex/types").to_request();
    let actual: Vec<Type> = test::call_and_read_body_json(&service, req).await;

    assert_eq!(expected, actual);
}

#[test_log::test(actix_web::test)]
async fn test_public_scope_is_read_only() {
    init_test_service!(app, service);

    let req = test::TestRequest::post()
        .uri("/pokedex/types")
        .set_json(json!({ "name": "Ice" }))
        .to_request();
    let res = test::call_service(&service, req).await;

    assert!(res.status().is_client_error());
    assert_eq!(0, app.store().count(StoreOperation::CreateType));
}

#[test_log::test(actix_web::test)]
async fn test_admin_crud() {
    init_test_service!(app, service);
    let admin = app.session_cookie(Role::Admin);

    let req = test::TestRequest::post()
        .uri("/internal/pokedex/types")
        .cookie(admin.clone())
        .set_json(json!({ "name": "Ice" }))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::CREATED, res.status());
    let created: Type = test::read_body_json(res).await;
    assert_eq!(Type { id: 1, name: "Ice".into() }, created);

    let req = test::TestRequest::put()
        .uri("/internal/pokedex/types/1")
        .cookie(admin.clone())
        .set_json(json!({ "name": "Frost" }))
        .to_request();
    let updated: Type = test::call_and_read_body_json(&service, req).await;
    assert_eq!("Frost", updated.name);

    let req = test::TestRequest::with_uri("/internal/pokedex/types/1")
        .cookie(admin.clone())
        .to_request();
    let fetched: Type = test::call_and_read_body_json(&service, req).await;
    assert_eq!(updated, fetched);

    let req = test::TestRequest::delete()
        .uri("/internal/pokedex/types/1")
        .cookie(admin.clone())
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::NO_CONTENT, res.status());

    let req = test::TestRequest::with_uri("/internal/pokedex/types/1")
        .cookie(admin)
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::NOT_FOUND, res.status());
}

#[test_log::test(actix_web::test)]
async fn test_invalid_body() {
    init_test_service!(app, service);

    for body in [json!({ "name": "" }), json!({ "name": "Ice", "color": "blue" }), json!({})] {
        let req = test::TestRequest::post()
            .uri("/internal/pokedex/types")
            .cookie(app.session_cookie(Role::Admin))
            .set_json(&body)
            .to_request();
        let res = test::call_service(&service, req).await;

        assert_eq!(StatusCode::BAD_REQUEST, res.status(), "body: {}", body);
    }
    assert_eq!(0, app.store().count(StoreOperation::CreateType));
}

#[test_log::test(actix_web::test)]
async fn test_user_cannot_manage_types() {
    init_test_service!(app, service);

    let req = test::TestRequest::post()
        .uri("/internal/pokedex/types")
        .cookie(app.session_cookie(Role::User))
        .set_json(json!({ "name": "Ice" }))
        .to_request();
    let res = test::call_service(&service, req).await;

    assert_eq!(StatusCode::FORBIDDEN, res.status());
}

#[test_log::test(actix_web::test)]
async fn test_deleted_type_leaves_pokemon_lists() {
    init_test_service!(app, service);
    app.seed_types(&TYPE_NAMES).await;
    let pokemon = app
        .seed_pokemon(&build_pokemon_request("Bulbasaur", vec![1, 2]))
        .await;

    let req = test::TestRequest::delete()
        .uri("/internal/pokedex/types/2")
        .cookie(app.session_cookie(Role::Admin))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::NO_CONTENT, res.status());

    let req = test::TestRequest::with_uri(&format!("/pokedex/pokemons/{}", pokemon.id))
        .to_request();
    let detail: PokemonDetail = test::call_and_read_body_json(&service, req).await;
    assert_eq!(vec!["Grass"], detail.types);
    assert_eq!(vec![(1, 1), (2, 2)], app.store().raw_associations(pokemon.id));
}
