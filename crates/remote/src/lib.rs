//! Pooled HTTP client for the services the customers service depends on.
//!
//! One `reqwest::Client` (and so one connection pool) is built at startup
//! and shared by every dependency client. Each dependency gets its own
//! circuit breaker; idempotent calls get a bounded retry budget.

pub mod errors;
pub mod circuit_breaker;
pub mod retry;
pub mod observability;
pub mod client;
pub mod people;
pub mod pets;

use std::sync::Arc;

use configs::{CircuitBreakerConfig, RemoteConfig};

pub use client::RemoteClient;
pub use errors::RemoteError;
pub use people::{PeopleApi, PeopleClient};
pub use pets::{PetsApi, PetsClient};

pub const PEOPLE_SERVICE: &str = "people-service";
pub const PETS_SERVICE: &str = "pets-service";

/// The process-wide dependency clients. Built once, cloned into request state.
#[derive(Clone)]
pub struct RemoteClients {
    pub people: Arc<PeopleClient>,
    pub pets: Arc<PetsClient>,
}

impl RemoteClients {
    pub fn init(remote: &RemoteConfig, breaker: &CircuitBreakerConfig) -> Result<Self, RemoteError> {
        let http = client::build_http_client(remote)?;
        let people = RemoteClient::from_config(PEOPLE_SERVICE, &remote.people_service_url, http.clone(), remote, breaker)?;
        let pets = RemoteClient::from_config(PETS_SERVICE, &remote.pets_service_url, http, remote, breaker)?;
        Ok(Self {
            people: Arc::new(PeopleClient::new(people)),
            pets: Arc::new(PetsClient::new(pets)),
        })
    }
}
