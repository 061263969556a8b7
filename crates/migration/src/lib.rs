//! Migrators for the two services. Each service owns its own database,
//! so the customers and people schemas are registered separately.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_owners;
mod m20240101_000002_create_people;
mod m20240101_000003_add_owner_indexes;

/// Schema of the customers service (`owners`).
pub struct CustomersMigrator;

#[async_trait::async_trait]
impl MigratorTrait for CustomersMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_owners::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000003_add_owner_indexes::Migration),
        ]
    }
}

/// Schema of the people service (`people`).
pub struct PeopleMigrator;

#[async_trait::async_trait]
impl MigratorTrait for PeopleMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000002_create_people::Migration)]
    }
}
