//! Create `owners` table.
//!
//! `person_synced` records whether the people service holds the owner's twin.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Owners::Table)
                    .if_not_exists()
                    .col(pk_auto(Owners::Id))
                    .col(string_len(Owners::FirstName, 30).not_null())
                    .col(string_len(Owners::LastName, 30).not_null())
                    .col(string_len(Owners::Address, 255).not_null())
                    .col(string_len(Owners::City, 80).not_null())
                    .col(string_len(Owners::Telephone, 12).not_null())
                    .col(boolean(Owners::PersonSynced).not_null().default(true))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Owners::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Owners {
    Table,
    Id,
    FirstName,
    LastName,
    Address,
    City,
    Telephone,
    PersonSynced,
}
