pub mod repository;
pub mod service;
pub mod sync;

pub use repository::{InMemoryOwnerRepository, OwnerRepository, SeaOrmOwnerRepository};
pub use service::OwnerService;
pub use sync::{PersonSyncHandle, PersonSyncWorker, SyncJob};
