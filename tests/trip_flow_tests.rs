// tests/trip_flow_tests.rs
//
// End-to-end scenarios for the trip / participant / join-request workflow
// and the review subsystem.

use carpool_backend::{config::Config, routes, state::AppState};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Spawns the app on a random port and returns (base URL, pool).
/// Returns None (skipping the test) when DATABASE_URL is not set.
async fn spawn_app() -> Option<(String, PgPool)> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        access_token_expiration: 600,
        refresh_token_expiration: 3600,
        rust_log: "error".to_string(),
        upload_dir: std::env::temp_dir()
            .join("carpool-test-uploads")
            .to_string_lossy()
            .into_owned(),
        geo_seed_path: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some((address, pool))
}

fn unique_email() -> String {
    format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

/// Seeds a state with two cities and returns their ids.
/// Names are suffixed to keep runs independent.
async fn seed_geo(pool: &PgPool) -> (i64, i64) {
    let suffix = &uuid::Uuid::new_v4().to_string()[..8];

    let state_id: i64 = sqlx::query_scalar(
        "INSERT INTO states (name, abbreviation, country) VALUES ($1, 'BA', 'Argentina') RETURNING id",
    )
    .bind(format!("Testland {}", suffix))
    .fetch_one(pool)
    .await
    .unwrap();

    let city_1: i64 = sqlx::query_scalar(
        "INSERT INTO cities (name, latitude, longitude, state_id) VALUES ($1, -34.6, -58.4, $2) RETURNING id",
    )
    .bind(format!("Origin {}", suffix))
    .bind(state_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let city_2: i64 = sqlx::query_scalar(
        "INSERT INTO cities (name, latitude, longitude, state_id) VALUES ($1, -31.4, -64.2, $2) RETURNING id",
    )
    .bind(format!("Destination {}", suffix))
    .bind(state_id)
    .fetch_one(pool)
    .await
    .unwrap();

    (city_1, city_2)
}

async fn register_and_login(
    client: &reqwest::Client,
    address: &str,
    first_name: &str,
) -> (i64, String) {
    let email = unique_email();
    let response = client
        .post(format!("{}/api/users", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "firstName": first_name,
            "lastName": "tester",
            "birthDate": "1990-05-01",
            "documentNumber": "12345678",
            "phoneNumber": "+5493511234567"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Login failed");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let token = body["access"].as_str().unwrap().to_string();

    (id, token)
}

async fn create_vehicle(client: &reqwest::Client, address: &str, token: &str, plate: &str) -> i64 {
    let response = client
        .post(format!("{}/api/vehicles", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "licensePlate": plate, "brand": "fiat", "model": "cronos" }))
        .send()
        .await
        .expect("Vehicle creation failed");
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

fn tomorrow() -> String {
    (Utc::now().date_naive() + Duration::days(1)).to_string()
}

fn trip_payload(
    origin: i64,
    destination: i64,
    date: &str,
    time: &str,
    vehicle: i64,
) -> serde_json::Value {
    serde_json::json!({
        "originCity": origin,
        "destinationCity": destination,
        "departureDate": date,
        "departureTime": time,
        "petAllowed": true,
        "smokingAllowed": false,
        "kidsAllowed": false,
        "vehicle": vehicle
    })
}

async fn create_trip(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    payload: &serde_json::Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/trips", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(payload)
        .send()
        .await
        .expect("Trip creation request failed")
}

#[tokio::test]
async fn create_trip_enrolls_creator_as_driver() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token) = register_and_login(&client, &address, "ana").await;
    let vehicle = create_vehicle(&client, &address, &token, "ABC123").await;

    let response = create_trip(
        &client,
        &address,
        &token,
        &trip_payload(city_1, city_2, &tomorrow(), "08:15:00", vehicle),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);
    let trip: serde_json::Value = response.json().await.unwrap();

    // Exactly one participant: the creator as driver.
    let participants = trip["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["role"], "driver");
    assert_eq!(participants[0]["user"], "Ana");

    // The overview nests the vehicle summary without the plate.
    assert_eq!(trip["vehicle"]["brand"], "Fiat");
    assert!(trip["vehicle"].get("licensePlate").is_none());

    // Trip listing is open to unauthenticated callers.
    let trip_id = trip["id"].as_i64().unwrap();
    let response = client
        .get(format!("{}/api/trips", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let trips: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(trips.iter().any(|t| t["id"].as_i64() == Some(trip_id)));
}

#[tokio::test]
async fn trip_validation_rules() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token) = register_and_login(&client, &address, "ana").await;
    let vehicle = create_vehicle(&client, &address, &token, "ABC123").await;

    // Origin and destination must differ.
    let response = create_trip(
        &client,
        &address,
        &token,
        &trip_payload(city_1, city_1, &tomorrow(), "08:15:00", vehicle),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);

    // Departure cannot be in the past.
    let yesterday = (Utc::now().date_naive() - Duration::days(1)).to_string();
    let response = create_trip(
        &client,
        &address,
        &token,
        &trip_payload(city_1, city_2, &yesterday, "08:15:00", vehicle),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);

    // Departure cannot be more than a year out.
    let far_out = (Utc::now().date_naive() + Duration::days(400)).to_string();
    let response = create_trip(
        &client,
        &address,
        &token,
        &trip_payload(city_1, city_2, &far_out, "08:15:00", vehicle),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn trip_vehicle_must_belong_to_creator() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token_a) = register_and_login(&client, &address, "ana").await;
    let (_, token_b) = register_and_login(&client, &address, "bruno").await;
    let vehicle_a = create_vehicle(&client, &address, &token_a, "ABC123").await;

    let response = create_trip(
        &client,
        &address,
        &token_b,
        &trip_payload(city_1, city_2, &tomorrow(), "08:15:00", vehicle_a),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn creator_cannot_hold_two_trips_at_same_slot() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token) = register_and_login(&client, &address, "ana").await;
    let vehicle = create_vehicle(&client, &address, &token, "ABC123").await;
    let other_vehicle = create_vehicle(&client, &address, &token, "AB123CD").await;

    let response = create_trip(
        &client,
        &address,
        &token,
        &trip_payload(city_1, city_2, &tomorrow(), "09:30:00", vehicle),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);

    // Same departure date + time, different trip: rejected.
    let response = create_trip(
        &client,
        &address,
        &token,
        &trip_payload(city_2, city_1, &tomorrow(), "09:30:00", other_vehicle),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);

    // A different time is fine.
    let response = create_trip(
        &client,
        &address,
        &token,
        &trip_payload(city_2, city_1, &tomorrow(), "17:45:00", other_vehicle),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn join_request_flow() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token_a) = register_and_login(&client, &address, "ana").await;
    let (_, token_b) = register_and_login(&client, &address, "bruno").await;
    let vehicle = create_vehicle(&client, &address, &token_a, "ABC123").await;

    let response = create_trip(
        &client,
        &address,
        &token_a,
        &trip_payload(city_1, city_2, &tomorrow(), "10:20:00", vehicle),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);
    let trip: serde_json::Value = response.json().await.unwrap();
    let trip_id = trip["id"].as_i64().unwrap();

    // The creator cannot ask to join their own trip.
    let response = client
        .post(format!("{}/api/join-requests", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "trip": trip_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // B asks to join: the request starts out pending.
    let response = client
        .post(format!("{}/api/join-requests", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "trip": trip_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let request: serde_json::Value = response.json().await.unwrap();
    assert_eq!(request["status"], "pending");
    let request_id = request["id"].as_i64().unwrap();

    // A duplicate request for the same (user, trip) is rejected.
    let response = client
        .post(format!("{}/api/join-requests", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "trip": trip_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // The requester is not the trip creator, so they cannot see or resolve it.
    let response = client
        .put(format!("{}/api/join-requests/{}", address, request_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "status": "accepted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // The creator sees it in the trip-scoped listing.
    let response = client
        .get(format!("{}/api/trips/{}/join-requests", address, trip_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let requests: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(requests.len(), 1);

    // The creator accepts: B becomes a passenger.
    let response = client
        .put(format!("{}/api/join-requests/{}", address, request_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "status": "accepted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let resolved: serde_json::Value = response.json().await.unwrap();
    assert_eq!(resolved["status"], "accepted");

    let response = client
        .get(format!("{}/api/trips/{}", address, trip_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap();
    let trip: serde_json::Value = response.json().await.unwrap();
    let participants = trip["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);
    assert!(participants.iter().any(|p| p["role"] == "passenger"));

    // Resolving twice is rejected.
    let response = client
        .put(format!("{}/api/join-requests/{}", address, request_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "status": "rejected" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // B cannot file a second request on the same trip.
    let response = client
        .post(format!("{}/api/join-requests", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "trip": trip_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn rejecting_creates_no_participant() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token_a) = register_and_login(&client, &address, "ana").await;
    let (_, token_b) = register_and_login(&client, &address, "bruno").await;
    let vehicle = create_vehicle(&client, &address, &token_a, "ABC123").await;

    let response = create_trip(
        &client,
        &address,
        &token_a,
        &trip_payload(city_1, city_2, &tomorrow(), "11:40:00", vehicle),
    )
    .await;
    let trip: serde_json::Value = response.json().await.unwrap();
    let trip_id = trip["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/api/join-requests", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "trip": trip_id }))
        .send()
        .await
        .unwrap();
    let request: serde_json::Value = response.json().await.unwrap();
    let request_id = request["id"].as_i64().unwrap();

    let response = client
        .put(format!("{}/api/join-requests/{}", address, request_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "status": "rejected" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let resolved: serde_json::Value = response.json().await.unwrap();
    assert_eq!(resolved["status"], "rejected");

    let response = client
        .get(format!("{}/api/trips/{}", address, trip_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap();
    let trip: serde_json::Value = response.json().await.unwrap();
    assert_eq!(trip["participants"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn accepting_fails_when_requester_slot_is_taken() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token_a) = register_and_login(&client, &address, "ana").await;
    let (_, token_b) = register_and_login(&client, &address, "bruno").await;
    let vehicle_a = create_vehicle(&client, &address, &token_a, "ABC123").await;
    let vehicle_b = create_vehicle(&client, &address, &token_b, "AB123CD").await;

    // Both drivers leave at the same date + time.
    let response = create_trip(
        &client,
        &address,
        &token_a,
        &trip_payload(city_1, city_2, &tomorrow(), "12:10:00", vehicle_a),
    )
    .await;
    let trip_a: serde_json::Value = response.json().await.unwrap();
    let trip_a_id = trip_a["id"].as_i64().unwrap();

    let response = create_trip(
        &client,
        &address,
        &token_b,
        &trip_payload(city_2, city_1, &tomorrow(), "12:10:00", vehicle_b),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);

    // B may still ask to join A's trip...
    let response = client
        .post(format!("{}/api/join-requests", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "trip": trip_a_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let request: serde_json::Value = response.json().await.unwrap();
    let request_id = request["id"].as_i64().unwrap();

    // ...but acceptance is blocked by B's own trip at that slot.
    let response = client
        .put(format!("{}/api/join-requests/{}", address, request_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "status": "accepted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn direct_participant_mutation_is_forbidden() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token_a) = register_and_login(&client, &address, "ana").await;
    let vehicle = create_vehicle(&client, &address, &token_a, "ABC123").await;
    let response = create_trip(
        &client,
        &address,
        &token_a,
        &trip_payload(city_1, city_2, &tomorrow(), "13:50:00", vehicle),
    )
    .await;
    let trip: serde_json::Value = response.json().await.unwrap();
    let trip_id = trip["id"].as_i64().unwrap();
    let participant_id = trip["participants"][0]["id"].as_i64().unwrap();

    // Direct creation is forbidden outright.
    let response = client
        .post(format!("{}/api/participants", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "trip": trip_id, "role": "passenger" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    // Participant rows are immutable.
    let response = client
        .put(format!("{}/api/participants/{}", address, participant_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "role": "passenger" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    // Removing one's own participation is allowed.
    let response = client
        .delete(format!("{}/api/participants/{}", address, participant_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
async fn trip_mutation_is_creator_scoped() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (_, token_a) = register_and_login(&client, &address, "ana").await;
    let (_, token_b) = register_and_login(&client, &address, "bruno").await;
    let vehicle = create_vehicle(&client, &address, &token_a, "ABC123").await;

    let response = create_trip(
        &client,
        &address,
        &token_a,
        &trip_payload(city_1, city_2, &tomorrow(), "14:25:00", vehicle),
    )
    .await;
    let trip: serde_json::Value = response.json().await.unwrap();
    let trip_id = trip["id"].as_i64().unwrap();

    // Someone else's trip answers 404 on mutation.
    let response = client
        .patch(format!("{}/api/trips/{}", address, trip_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "petAllowed": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // The creator can flip an amenity flag.
    let response = client
        .patch(format!("{}/api/trips/{}", address, trip_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "smokingAllowed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["smokingAllowed"], true);
    assert_eq!(updated["petAllowed"], true);

    // Deleting cascades to participants and the trip disappears.
    let response = client
        .delete(format!("{}/api/trips/{}", address, trip_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .get(format!("{}/api/trips/{}", address, trip_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn review_flow() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let (city_1, city_2) = seed_geo(&pool).await;

    let (id_a, token_a) = register_and_login(&client, &address, "ana").await;
    let (id_b, token_b) = register_and_login(&client, &address, "bruno").await;
    let (id_c, _) = register_and_login(&client, &address, "carla").await;
    let vehicle = create_vehicle(&client, &address, &token_a, "ABC123").await;

    let response = create_trip(
        &client,
        &address,
        &token_a,
        &trip_payload(city_1, city_2, &tomorrow(), "15:35:00", vehicle),
    )
    .await;
    let trip: serde_json::Value = response.json().await.unwrap();
    let trip_id = trip["id"].as_i64().unwrap();

    // Enroll B as a passenger through the sanctioned path.
    let response = client
        .post(format!("{}/api/join-requests", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "trip": trip_id }))
        .send()
        .await
        .unwrap();
    let request: serde_json::Value = response.json().await.unwrap();
    let request_id = request["id"].as_i64().unwrap();
    client
        .put(format!("{}/api/join-requests/{}", address, request_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "status": "accepted" }))
        .send()
        .await
        .unwrap();

    // Rating outside [1, 5] is rejected.
    let response = client
        .post(format!("{}/api/reviews", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "user": id_b, "trip": trip_id, "rating": 6, "comment": "ok" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Reviewing a non-participant is rejected.
    let response = client
        .post(format!("{}/api/reviews", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "user": id_c, "trip": trip_id, "rating": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Self-review is rejected.
    let response = client
        .post(format!("{}/api/reviews", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "user": id_a, "trip": trip_id, "rating": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // The driver reviews the passenger; the reviewer id is hidden behind a
    // display name.
    let response = client
        .post(format!("{}/api/reviews", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "user": id_b, "trip": trip_id, "rating": 5, "comment": "great company" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let review: serde_json::Value = response.json().await.unwrap();
    assert_eq!(review["user"], id_b);
    assert_eq!(review["reviewer"], "Ana Tester");
    assert!(review.get("reviewerId").is_none());

    // One review per (user, trip, reviewer).
    let response = client
        .post(format!("{}/api/reviews", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "user": id_b, "trip": trip_id, "rating": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // The passenger reviews the driver as well.
    let response = client
        .post(format!("{}/api/reviews", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "user": id_a, "trip": trip_id, "rating": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // Only the reviewer can edit their review.
    let review_id = review["id"].as_i64().unwrap();
    let response = client
        .patch(format!("{}/api/reviews/{}", address, review_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "rating": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .patch(format!("{}/api/reviews/{}", address, review_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "rating": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["rating"], 4);
}
