pub mod repository;
pub mod service;

pub use repository::{InMemoryPersonRepository, PersonRepository, SeaOrmPersonRepository};
pub use service::PeopleService;
