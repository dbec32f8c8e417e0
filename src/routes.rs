// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{auth, geo, join_request, participant, review, trip, user, vehicle},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, geography, vehicles, trips,
///   participants, join requests, reviews).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // let governor_conf = GovernorConfigBuilder::default()
    //     .per_second(2)
    //     .burst_size(5)
    //     .finish()
    //     .unwrap();

    // let governor_conf = Arc::new(governor_conf);

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh));

    // Registration is open; everything else about users requires a token.
    let user_routes = Router::new()
        .route("/", post(user::register))
        .merge(
            Router::new()
                .route("/", get(user::list_users))
                .route(
                    "/{id}",
                    get(user::get_user)
                        .put(user::update_user)
                        .patch(user::update_user),
                )
                .route(
                    "/me/picture",
                    post(user::upload_profile_picture)
                        .layer(DefaultBodyLimit::max(user::MAX_PICTURE_BYTES + 64 * 1024)),
                )
                .layer(auth_layer.clone()),
        );

    let state_routes = Router::new()
        .route("/", get(geo::list_states))
        .route("/{id}", get(geo::get_state))
        .layer(auth_layer.clone());

    let city_routes = Router::new()
        .route("/", get(geo::list_cities))
        .route("/{id}", get(geo::get_city))
        .layer(auth_layer.clone());

    let vehicle_routes = Router::new()
        .route("/", get(vehicle::list_vehicles).post(vehicle::create_vehicle))
        .route(
            "/{id}",
            get(vehicle::get_vehicle)
                .put(vehicle::update_vehicle)
                .patch(vehicle::update_vehicle)
                .delete(vehicle::delete_vehicle),
        )
        .layer(auth_layer.clone());

    // Listing trips is the one public read; mutation requires a token.
    let trip_routes = Router::new()
        .route("/", get(trip::list_trips))
        .merge(
            Router::new()
                .route("/", post(trip::create_trip))
                .route(
                    "/{id}",
                    get(trip::get_trip)
                        .put(trip::update_trip)
                        .patch(trip::update_trip)
                        .delete(trip::delete_trip),
                )
                .route(
                    "/{id}/join-requests",
                    get(join_request::list_trip_join_requests),
                )
                .layer(auth_layer.clone()),
        );

    let participant_routes = Router::new()
        .route(
            "/",
            get(participant::list_participants).post(participant::create_participant),
        )
        .route(
            "/{id}",
            get(participant::get_participant)
                .put(participant::update_participant)
                .patch(participant::update_participant)
                .delete(participant::delete_participant),
        )
        .layer(auth_layer.clone());

    let join_request_routes = Router::new()
        .route(
            "/",
            get(join_request::list_join_requests).post(join_request::create_join_request),
        )
        .route(
            "/{id}",
            get(join_request::get_join_request)
                .put(join_request::resolve_join_request)
                .patch(join_request::resolve_join_request)
                .delete(join_request::delete_join_request),
        )
        .layer(auth_layer.clone());

    let review_routes = Router::new()
        .route("/", get(review::list_reviews).post(review::create_review))
        .route(
            "/{id}",
            get(review::get_review)
                .put(review::update_review)
                .patch(review::update_review)
                .delete(review::delete_review),
        )
        .layer(auth_layer.clone());

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/states", state_routes)
        .nest("/api/cities", city_routes)
        .nest("/api/vehicles", vehicle_routes)
        .nest("/api/trips", trip_routes)
        .nest("/api/participants", participant_routes)
        .nest("/api/join-requests", join_request_routes)
        .nest("/api/reviews", review_routes)
        // Uploaded profile pictures are served back as static files.
        .nest_service("/media", ServeDir::new(&state.config.upload_dir))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // .layer(GovernorLayer::new(governor_conf))
        .with_state(state)
}
