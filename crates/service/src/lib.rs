//! Service layer of the petclinic customers and people services.
//! - `owners` composes the local owner store with the people and pets services.
//! - `people` backs the people service's own endpoints.
//! - Repositories are traits with SeaORM and in-memory implementations.

pub mod errors;
pub mod storage;
pub mod owners;
pub mod people;
#[cfg(test)]
pub mod test_support;
