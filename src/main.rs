// src/main.rs

use carpool_backend::config::Config;
use carpool_backend::models::geo::GeoSeed;
use carpool_backend::routes;
use carpool_backend::state::AppState;
use carpool_backend::utils::text::title_case;
use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    // Seed geography reference data (states/cities are read-only via the API)
    if let Err(e) = seed_geo_reference_data(&pool, &config).await {
        tracing::error!("Failed to seed geography reference data: {:?}", e);
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        tracing::error!("Failed to create upload directory: {:?}", e);
    }

    // Create AppState
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

/// Loads states and cities from the optional GEO_SEED_PATH file.
/// Existing rows are kept; names are normalized the same way every write
/// path normalizes them (title-cased names, upper-cased abbreviations).
async fn seed_geo_reference_data(
    pool: &PgPool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = &config.geo_seed_path else {
        return Ok(());
    };

    let raw = tokio::fs::read_to_string(path).await?;
    let seed: GeoSeed = serde_json::from_str(&raw)?;

    for state in seed.states {
        let name = title_case(&state.name);
        let abbreviation = state.abbreviation.to_uppercase();
        let country = title_case(&state.country);

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO states (name, abbreviation, country)
            VALUES ($1, $2, $3)
            ON CONFLICT (name, abbreviation, country) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(&abbreviation)
        .bind(&country)
        .fetch_optional(pool)
        .await?;

        let state_id = match inserted {
            Some(id) => id,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT id FROM states WHERE name = $1 AND abbreviation = $2 AND country = $3",
                )
                .bind(&name)
                .bind(&abbreviation)
                .bind(&country)
                .fetch_one(pool)
                .await?
            }
        };

        for city in state.cities {
            let city_name = title_case(&city.name);

            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM cities WHERE name = $1 AND state_id = $2)",
            )
            .bind(&city_name)
            .bind(state_id)
            .fetch_one(pool)
            .await?;

            if !exists {
                sqlx::query(
                    "INSERT INTO cities (name, latitude, longitude, state_id) VALUES ($1, $2, $3, $4)",
                )
                .bind(&city_name)
                .bind(city.latitude)
                .bind(city.longitude)
                .bind(state_id)
                .execute(pool)
                .await?;
            }
        }
    }

    tracing::info!("Geography reference data seeded.");
    Ok(())
}
