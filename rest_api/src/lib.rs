// rest_api/src/lib.rs

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::Method,
    routing::{get, patch, post},
};
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use lib::AllocationEngine;
use lib::config::ServerConfig;

pub mod errors;
pub mod extract;
pub mod handlers;

pub use errors::RestApiError;

use handlers::*;

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AllocationEngine>,
}

pub fn router(engine: Arc<AllocationEngine>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/emergency/allocate", post(allocate_handler))
        .route("/api/hospitals", get(list_hospitals_handler).post(create_hospital_handler))
        .route("/api/hospitals/search/nearest", get(search_nearest_handler))
        .route("/api/hospitals/available", get(hospitals_with_availability_handler))
        .route("/api/hospitals/city/:city", get(hospitals_by_city_handler))
        .route("/api/hospitals/specialty/:code", get(hospitals_by_specialty_handler))
        .route(
            "/api/hospitals/:id",
            get(get_hospital_handler)
                .put(update_hospital_handler)
                .delete(delete_hospital_handler),
        )
        .route("/api/hospitals/:id/available-beds/recount", post(recount_available_beds_handler))
        .route(
            "/api/hospitals/:id/specialties/:specialty_id",
            post(add_hospital_specialty_handler).delete(remove_hospital_specialty_handler),
        )
        .route("/api/beds", get(list_beds_handler).post(create_bed_handler))
        .route("/api/beds/emergency/search", get(emergency_bed_search_handler))
        .route("/api/beds/hospital/:hospital_id/available", get(available_beds_by_hospital_handler))
        .route("/api/beds/specialty/:code/available", get(available_beds_by_specialty_handler))
        .route(
            "/api/beds/:id",
            get(get_bed_handler).put(update_bed_handler).delete(delete_bed_handler),
        )
        .route("/api/beds/:id/status", patch(change_bed_status_handler))
        .route("/api/beds/:id/reserve", post(reserve_bed_handler))
        .route("/api/beds/:id/release", post(release_bed_handler))
        .route("/api/specialties", get(list_specialties_handler).post(create_specialty_handler))
        .route("/api/specialties/code/:code", get(specialty_by_code_handler))
        .route("/api/specialties/group/:group", get(specialties_by_group_handler))
        .route(
            "/api/specialties/:id",
            get(get_specialty_handler)
                .put(update_specialty_handler)
                .delete(delete_specialty_handler),
        )
        .route(
            "/api/specialty-groups",
            get(list_specialty_groups_handler).post(create_specialty_group_handler),
        )
        .route("/api/specialty-groups/code/:code", get(specialty_group_by_code_handler))
        .route(
            "/api/specialty-groups/:id",
            get(get_specialty_group_handler)
                .put(update_specialty_group_handler)
                .delete(delete_specialty_group_handler),
        )
        .with_state(AppState { engine })
        .layer(cors)
}

/// Serves the API until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, engine: Arc<AllocationEngine>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;
    info!("[RestApi] listening on {}", addr);

    axum::serve(listener, router(engine.clone()).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("REST API server failed to start or run")?;

    engine.flush().await?;
    info!("[RestApi] stopped");
    Ok(())
}
