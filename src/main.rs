mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::delivery::http::v1::auth::{change_password, login, profile, refresh, register};
use crate::delivery::http::v1::favorites::{list_favorites, toggle_favorite};
use crate::delivery::http::v1::middleware::auth_middleware;
use crate::delivery::http::v1::places::{
    create_place, delete_place, get_place, landing, list_places, map_places, suggestions,
};
use crate::delivery::http::v1::ratings::{create_rating, delete_rating};
use crate::delivery::http::v1::routes::{book_visit, delete_route, list_routes, plan_route};
use crate::repository::postgres::{create_pool, PostgresRepository};
use crate::usecase::auth::AuthUseCase;
use crate::usecase::favorites::FavoritesUseCase;
use crate::usecase::jwt::JwtService;
use crate::usecase::places::PlacesUseCase;
use crate::usecase::planned_routes::PlannedRoutesUseCase;
use crate::usecase::ratings::RatingsUseCase;
use crate::usecase::translator::TranslatorClient;

pub struct AppState {
    pub auth_usecase: AuthUseCase<PostgresRepository>,
    pub places_usecase: PlacesUseCase<PostgresRepository, PostgresRepository>,
    pub ratings_usecase: RatingsUseCase<PostgresRepository, PostgresRepository>,
    pub favorites_usecase: FavoritesUseCase<PostgresRepository, PostgresRepository>,
    pub planned_routes_usecase: PlannedRoutesUseCase<PostgresRepository, PostgresRepository>,
    pub jwt_service: JwtService,
    pub translator: TranslatorClient,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Initialize tracing subscriber with optional OpenTelemetry layer
    if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig {
            service_name: config.telemetry_service_name.clone(),
            service_version: config.telemetry_service_version.clone(),
            environment: config.telemetry_environment.clone(),
            otlp_endpoint: config.telemetry_otlp_endpoint.clone(),
        };

        telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)
            .expect("failed to initialize telemetry");
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter);
    }

    tracing::info!("starting the travel spots service");

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    tracing::info!("config loaded, telemetry_enabled={}", config.telemetry_enabled);

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .expect("failed to create database pool");
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let repository = PostgresRepository::new(pool);
    let jwt_service = JwtService::new(
        config.jwt_secret.clone(),
        config.jwt_access_token_minutes,
        config.jwt_refresh_token_days,
    );
    let translator = TranslatorClient::new(
        config.translator_url.clone(),
        config.translator_timeout_secs,
    );

    let shared_state = Arc::new(AppState {
        auth_usecase: AuthUseCase::new(repository.clone(), jwt_service.clone()),
        places_usecase: PlacesUseCase::new(repository.clone(), repository.clone()),
        ratings_usecase: RatingsUseCase::new(repository.clone(), repository.clone()),
        favorites_usecase: FavoritesUseCase::new(repository.clone(), repository.clone()),
        planned_routes_usecase: PlannedRoutesUseCase::new(repository.clone(), repository),
        jwt_service,
        translator,
        metrics_handle,
    });

    let protected_api = Router::new()
        .route("/api/v1/auth/me", get(profile))
        .route("/api/v1/auth/password", put(change_password))
        .route("/api/v1/places", get(list_places).post(create_place))
        .route("/api/v1/places/map", get(map_places))
        .route("/api/v1/places/suggestions", get(suggestions))
        .route("/api/v1/places/{id}", get(get_place).delete(delete_place))
        .route("/api/v1/places/{id}/ratings", post(create_rating))
        .route("/api/v1/places/{id}/favorite", post(toggle_favorite))
        .route("/api/v1/places/{id}/plan", post(plan_route))
        .route("/api/v1/ratings/{id}/delete", post(delete_rating))
        .route("/api/v1/favorites", get(list_favorites))
        .route("/api/v1/bookings", post(book_visit))
        .route("/api/v1/routes", get(list_routes))
        .route("/api/v1/routes/{id}/delete", post(delete_route))
        .layer(middleware::from_fn_with_state(
            shared_state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/landing", get(landing))
        .merge(protected_api)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("travel spots service running on 0.0.0.0:8080");
    axum::serve(listener, router).await?;

    // Shutdown telemetry on exit
    if config.telemetry_enabled {
        telemetry::shutdown_telemetry();
    }

    Ok(())
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
