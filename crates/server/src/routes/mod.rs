pub mod owners;
pub mod people;

use axum::{
    routing::{get, post},
    Json, Router,
};
use common::{metrics::metrics_handler, types::Health};
use service::{owners::OwnerService, people::PeopleService};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::openapi::{CustomersApiDoc, PeopleApiDoc};

pub const CUSTOMERS_SERVICE: &str = "customers-service";
pub const PEOPLE_SERVICE: &str = "people-service";

#[derive(Clone)]
pub struct CustomersState {
    pub owners: OwnerService,
}

#[derive(Clone)]
pub struct PeopleState {
    pub people: PeopleService,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn customers_health() -> Json<Health> {
    Json(Health::for_service(CUSTOMERS_SERVICE))
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn people_health() -> Json<Health> {
    Json(Health::for_service(PEOPLE_SERVICE))
}

/// Router of the customers service: owner endpoints plus the pet proxies.
pub fn build_customers_router(state: CustomersState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/owners", get(owners::list_owners).post(owners::create_owner))
        .route("/owners/petTypes", get(owners::list_pet_types))
        .route("/owners/:id", get(owners::find_owner).put(owners::update_owner))
        .route("/owners/owners/:owner_id/pets", post(owners::create_pet))
        .route("/owners/owners/:owner_id/pets/:pet_id", get(owners::find_pet).put(owners::update_pet))
        .with_state(state)
        .route("/health", get(customers_health))
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(|| async { Json(CustomersApiDoc::openapi()) }))
        .layer(cors)
        .layer(trace_layer())
}

pub fn build_people_router(state: PeopleState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/people", get(people::list_people).post(people::create_person))
        .with_state(state)
        .route("/health", get(people_health))
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(|| async { Json(PeopleApiDoc::openapi()) }))
        .layer(cors)
        .layer(trace_layer())
}

fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
        // 5xx responses are logged at error
        .on_failure(DefaultOnFailure::new().level(Level::ERROR))
}
