//! End-to-end HTTP tests over the full router: auth endpoints, the admin
//! gate, and Pokédex CRUD with and without bearer tokens.

mod common;

use axum_test::TestServer;
use common::{api_state, memory_pool};
use pokedex::api::build_router;
use pokedex::storage::DbPool;
use serde_json::{json, Value};

async fn test_server() -> (TestServer, DbPool) {
    let pool = memory_pool().await;
    let router = build_router(api_state(pool.clone()).await);
    (TestServer::new(router).expect("start test server"), pool)
}

async fn sign_up(server: &TestServer, email: &str) -> Value {
    let response = server
        .post("/auth/signup")
        .json(&json!({
            "email": email,
            "password": "correct-horse",
            "firstName": "Ash",
            "lastName": "Ketchum"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Register an account and sign in, returning the sign-in payload
/// (user + accessToken + refreshToken).
async fn register_and_sign_in(server: &TestServer, email: &str) -> Value {
    sign_up(server, email).await;
    let response = server
        .post("/auth/signin")
        .json(&json!({"email": email, "password": "correct-horse"}))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

fn bulbasaur() -> Value {
    json!({
        "id": 1,
        "num": "001",
        "name": "Bulbasaur",
        "img": "http://www.serebii.net/pokemongo/pokemon/001.png",
        "type": ["Grass", "Poison"],
        "height": "0.71 m",
        "weight": "6.9 kg",
        "candy": "Bulbasaur Candy",
        "egg": "2 km",
        "multipliers": [1.58],
        "weaknesses": ["Fire", "Ice", "Flying", "Psychic"],
        "spawn_chance": 0.69,
        "avg_spawns": 69.0,
        "spawn_time": "20:00"
    })
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let (server, _pool) = test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn signup_returns_public_profile() {
    let (server, _pool) = test_server().await;

    let profile = sign_up(&server, "ash@pallet.town").await;
    assert_eq!(profile["firstName"], "Ash");
    assert_eq!(profile["status"], "active");
    // The credential link never leaves the server.
    assert!(profile["authId"].is_null());
    assert!(profile["auth_id"].is_null());
}

#[tokio::test]
async fn signup_validates_email_and_password() {
    let (server, _pool) = test_server().await;

    let response = server
        .post("/auth/signup")
        .json(&json!({"email": "not-an-email", "password": "correct-horse"}))
        .await;
    response.assert_status_bad_request();

    let response = server
        .post("/auth/signup")
        .json(&json!({"email": "ash@pallet.town", "password": "short"}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn duplicate_signup_returns_conflict() {
    let (server, _pool) = test_server().await;
    sign_up(&server, "misty@cerulean.city").await;

    let response = server
        .post("/auth/signup")
        .json(&json!({"email": "misty@cerulean.city", "password": "correct-horse"}))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn signin_with_wrong_password_returns_unauthorized() {
    let (server, _pool) = test_server().await;
    sign_up(&server, "brock@pewter.city").await;

    let response = server
        .post("/auth/signin")
        .json(&json!({"email": "brock@pewter.city", "password": "wrong-password"}))
        .await;
    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["message"], "Invalid email or password");
}

#[tokio::test]
async fn me_requires_a_bearer_token() {
    let (server, _pool) = test_server().await;

    let response = server.get("/auth/me").await;
    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["message"], "No token provided");

    let session = register_and_sign_in(&server, "ash@pallet.town").await;
    let token = session["accessToken"].as_str().unwrap();

    let response = server.get("/auth/me").authorization_bearer(token).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["firstName"], "Ash");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (server, _pool) = test_server().await;

    let response = server.get("/auth/me").authorization_bearer("garbage").await;
    response.assert_status_unauthorized();
    assert_eq!(
        response.json::<Value>()["message"],
        "Invalid token or insufficient permissions"
    );
}

#[tokio::test]
async fn refresh_endpoint_rotates_tokens() {
    let (server, _pool) = test_server().await;
    let session = register_and_sign_in(&server, "gary@pallet.town").await;
    let refresh_token = session["refreshToken"].as_str().unwrap().to_string();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let response =
        server.post("/auth/refresh").json(&json!({"refreshToken": refresh_token})).await;
    response.assert_status_ok();
    let tokens = response.json::<Value>();
    assert_ne!(tokens["refreshToken"].as_str().unwrap(), refresh_token);

    // The replaced token no longer refreshes.
    let response =
        server.post("/auth/refresh").json(&json!({"refreshToken": refresh_token})).await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn signout_requires_token_and_succeeds() {
    let (server, _pool) = test_server().await;
    let session = register_and_sign_in(&server, "jessie@team.rocket").await;
    let token = session["accessToken"].as_str().unwrap();

    let response = server.post("/auth/signout").await;
    response.assert_status_unauthorized();

    let response = server.post("/auth/signout").authorization_bearer(token).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Signed out successfully");
}

#[tokio::test]
async fn verify_admin_rejects_non_admins_and_accepts_admins() {
    let (server, pool) = test_server().await;
    let session = register_and_sign_in(&server, "giovanni@team.rocket").await;
    let token = session["accessToken"].as_str().unwrap();
    let profile_id = session["user"]["id"].as_str().unwrap();

    let response = server.post("/auth/verify-admin").authorization_bearer(token).await;
    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["message"], "Admin access required");

    // Grant the admin role directly in the store.
    sqlx::query("UPDATE profiles SET role = $1 WHERE id = $2")
        .bind(r#"{"id":1,"name":"Admin","key":"admin","permissions":[]}"#)
        .bind(profile_id)
        .execute(&pool)
        .await
        .expect("grant admin role");

    let response = server.post("/auth/verify-admin").authorization_bearer(token).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Admin access verified");
}

#[tokio::test]
async fn pokemon_reads_are_public() {
    let (server, _pool) = test_server().await;

    let response = server.get("/pokemons").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));

    let response = server.get("/pokemons/1").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn pokemon_mutations_require_a_token() {
    let (server, _pool) = test_server().await;

    let response = server.post("/pokemons").json(&bulbasaur()).await;
    response.assert_status_unauthorized();

    let response = server.delete("/pokemons/1").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn pokemon_crud_round_trip() {
    let (server, _pool) = test_server().await;
    let session = register_and_sign_in(&server, "oak@pallet.town").await;
    let token = session["accessToken"].as_str().unwrap();

    let response =
        server.post("/pokemons").authorization_bearer(token).json(&bulbasaur()).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created = response.json::<Value>();
    assert_eq!(created["name"], "Bulbasaur");
    assert_eq!(created["type"], json!(["Grass", "Poison"]));

    let response = server.get("/pokemons/1").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["num"], "001");

    let response = server
        .put("/pokemons/1")
        .authorization_bearer(token)
        .json(&json!({"name": "Ivysaur", "num": "002"}))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Value>();
    assert_eq!(updated["name"], "Ivysaur");
    // Untouched fields keep their stored values.
    assert_eq!(updated["spawn_time"], "20:00");

    let response = server.get("/pokemons").await;
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);

    let response = server.delete("/pokemons/1").authorization_bearer(token).await;
    response.assert_status_ok();

    let response = server.get("/pokemons/1").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn creating_duplicate_pokemon_id_conflicts() {
    let (server, _pool) = test_server().await;
    let session = register_and_sign_in(&server, "elm@newbark.town").await;
    let token = session["accessToken"].as_str().unwrap();

    server.post("/pokemons").authorization_bearer(token).json(&bulbasaur()).await;
    let response =
        server.post("/pokemons").authorization_bearer(token).json(&bulbasaur()).await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_rejects_missing_types() {
    let (server, _pool) = test_server().await;
    let session = register_and_sign_in(&server, "birch@littleroot.town").await;
    let token = session["accessToken"].as_str().unwrap();

    let mut entry = bulbasaur();
    entry["type"] = json!([]);

    let response = server.post("/pokemons").authorization_bearer(token).json(&entry).await;
    response.assert_status_bad_request();
}
