use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use common::shutdown::shutdown_signal;
use configs::{AppConfig, PersonSyncPolicy, StorageBackend};
use migration::{CustomersMigrator, MigratorTrait, PeopleMigrator};
use remote::retry::RetryPolicy;
use remote::RemoteClients;
use service::owners::{InMemoryOwnerRepository, OwnerRepository, OwnerService, PersonSyncWorker, SeaOrmOwnerRepository};
use service::people::{InMemoryPersonRepository, PeopleService, PersonRepository, SeaOrmPersonRepository};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, CustomersState, PeopleState, CUSTOMERS_SERVICE, PEOPLE_SERVICE};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.server.host, cfg.server.port))
}

async fn owner_repository(cfg: &AppConfig) -> anyhow::Result<Arc<dyn OwnerRepository>> {
    match cfg.database.backend {
        StorageBackend::Memory => {
            warn!(service = CUSTOMERS_SERVICE, "memory storage backend, owners are lost on restart");
            Ok(Arc::new(InMemoryOwnerRepository::new()))
        }
        StorageBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            if cfg.database.run_migrations {
                CustomersMigrator::up(&db, None).await.context("customers migrations")?;
            }
            Ok(Arc::new(SeaOrmOwnerRepository::new(db)))
        }
    }
}

async fn person_repository(cfg: &AppConfig) -> anyhow::Result<Arc<dyn PersonRepository>> {
    match cfg.database.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryPersonRepository::new())),
        StorageBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            if cfg.database.run_migrations {
                PeopleMigrator::up(&db, None).await.context("people migrations")?;
            }
            Ok(Arc::new(SeaOrmPersonRepository::new(db)))
        }
    }
}

/// Wire the owner orchestrator from configuration.
///
/// The shared HTTP client is built here, once per process. Under the
/// deferred policy the person sync worker is started and owners left
/// unsynced by a previous run are queued again.
pub async fn build_owner_service(
    cfg: &AppConfig,
    repo: Arc<dyn OwnerRepository>,
) -> anyhow::Result<(OwnerService, Option<JoinHandle<()>>)> {
    let clients = RemoteClients::init(&cfg.remote, &cfg.circuit_breaker)?;
    let mut owners = OwnerService::new(Arc::clone(&repo), clients.people.clone(), clients.pets.clone());
    if let Some(ttl) = cfg.owners.pet_types_cache_ttl() {
        owners = owners.with_pet_types_cache(ttl);
    }

    let mut worker_task = None;
    if cfg.owners.person_sync == PersonSyncPolicy::Deferred {
        let policy = RetryPolicy::new(
            cfg.owners.sync_max_attempts,
            cfg.owners.sync_backoff_base(),
            cfg.owners.sync_backoff_max(),
            true,
        );
        let (handle, task) = PersonSyncWorker::new(Arc::clone(&repo), clients.people.clone(), policy).spawn();
        let resumed = handle.resume_pending(repo.as_ref()).await?;
        info!(service = CUSTOMERS_SERVICE, resumed, "deferred person sync enabled");
        owners = owners.with_deferred_sync(handle);
        worker_task = Some(task);
    }
    Ok((owners, worker_task))
}

async fn serve(service: &'static str, app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("bind {addr}"))?;
    info!(service, %addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(service)).await?;
    Ok(())
}

/// Run the customers service until Ctrl+C.
pub async fn run_customers(cfg: AppConfig) -> anyhow::Result<()> {
    let repo = owner_repository(&cfg).await?;
    let (owners, worker_task) = build_owner_service(&cfg, repo).await?;
    info!(
        service = CUSTOMERS_SERVICE,
        people = %cfg.remote.people_service_url,
        pets = %cfg.remote.pets_service_url,
        policy = ?cfg.owners.person_sync,
        "dependencies configured"
    );

    let app = routes::build_customers_router(CustomersState { owners }, build_cors());
    serve(CUSTOMERS_SERVICE, app, bind_addr(&cfg)?).await?;

    // Owners still pending are queued again at next start.
    if let Some(task) = worker_task {
        task.abort();
    }
    Ok(())
}

/// Run the people service until Ctrl+C.
pub async fn run_people(cfg: AppConfig) -> anyhow::Result<()> {
    let people = PeopleService::new(person_repository(&cfg).await?);
    let app = routes::build_people_router(PeopleState { people }, build_cors());
    serve(PEOPLE_SERVICE, app, bind_addr(&cfg)?).await
}
