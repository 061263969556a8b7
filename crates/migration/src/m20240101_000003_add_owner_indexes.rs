//! Owner lookup indexes: by last name, and on `person_synced` for the
//! person-sync worker's startup scan of owners still waiting for a person.
use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_owners::Owners;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_owners_last_name")
                    .table(Owners::Table)
                    .col(Owners::LastName)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_owners_person_synced")
                    .table(Owners::Table)
                    .col(Owners::PersonSynced)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_owners_person_synced").table(Owners::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_owners_last_name").table(Owners::Table).to_owned())
            .await
    }
}
