use async_trait::async_trait;
use models::owner::{self, Owner, OwnerInput, OwnerUpdate};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};

use crate::errors::ServiceError;
use crate::storage::MemoryTable;

/// Persistence of owner records keyed by store-assigned ids.
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn insert(&self, input: &OwnerInput, person_synced: bool) -> Result<Owner, ServiceError>;
    async fn find(&self, id: i32) -> Result<Option<Owner>, ServiceError>;
    /// All owners in id order.
    async fn list(&self) -> Result<Vec<Owner>, ServiceError>;
    /// Merge `update` into owner `id` atomically. `None` when there is no such owner.
    async fn update(&self, id: i32, update: &OwnerUpdate) -> Result<Option<Owner>, ServiceError>;
    /// Returns whether a row was touched.
    async fn set_person_synced(&self, id: i32, synced: bool) -> Result<bool, ServiceError>;
    async fn list_unsynced(&self) -> Result<Vec<Owner>, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmOwnerRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmOwnerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OwnerRepository for SeaOrmOwnerRepository {
    async fn insert(&self, input: &OwnerInput, person_synced: bool) -> Result<Owner, ServiceError> {
        let am = owner::ActiveModel {
            id: NotSet,
            first_name: Set(input.first_name.clone()),
            last_name: Set(input.last_name.clone()),
            address: Set(input.address.clone()),
            city: Set(input.city.clone()),
            telephone: Set(input.telephone.clone()),
            person_synced: Set(person_synced),
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn find(&self, id: i32) -> Result<Option<Owner>, ServiceError> {
        Ok(owner::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list(&self) -> Result<Vec<Owner>, ServiceError> {
        Ok(owner::Entity::find().order_by_asc(owner::Column::Id).all(&self.db).await?)
    }

    async fn update(&self, id: i32, update: &OwnerUpdate) -> Result<Option<Owner>, ServiceError> {
        let txn = self.db.begin().await?;
        // Row lock keeps concurrent updates of the same owner serialized.
        let Some(current) = owner::Entity::find_by_id(id).lock_exclusive().one(&txn).await? else {
            txn.commit().await?;
            return Ok(None);
        };

        let mut merged = current.clone();
        update.apply_to(&mut merged);
        if merged == current {
            txn.commit().await?;
            return Ok(Some(current));
        }

        let mut am: owner::ActiveModel = current.into();
        am.first_name = Set(merged.first_name);
        am.last_name = Set(merged.last_name);
        am.address = Set(merged.address);
        am.city = Set(merged.city);
        am.telephone = Set(merged.telephone);
        let saved = am.update(&txn).await?;
        txn.commit().await?;
        Ok(Some(saved))
    }

    async fn set_person_synced(&self, id: i32, synced: bool) -> Result<bool, ServiceError> {
        let res = owner::Entity::update_many()
            .col_expr(owner::Column::PersonSynced, Expr::value(synced))
            .filter(owner::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn list_unsynced(&self) -> Result<Vec<Owner>, ServiceError> {
        Ok(owner::Entity::find()
            .filter(owner::Column::PersonSynced.eq(false))
            .order_by_asc(owner::Column::Id)
            .all(&self.db)
            .await?)
    }
}

/// In-memory repository for tests and the `memory` storage backend.
#[derive(Default)]
pub struct InMemoryOwnerRepository {
    table: MemoryTable<Owner>,
}

impl InMemoryOwnerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.table.len().await
    }
}

#[async_trait]
impl OwnerRepository for InMemoryOwnerRepository {
    async fn insert(&self, input: &OwnerInput, person_synced: bool) -> Result<Owner, ServiceError> {
        self.table
            .insert_with(|id| Owner {
                id,
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                address: input.address.clone(),
                city: input.city.clone(),
                telephone: input.telephone.clone(),
                person_synced,
            })
            .await
    }

    async fn find(&self, id: i32) -> Result<Option<Owner>, ServiceError> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self) -> Result<Vec<Owner>, ServiceError> {
        Ok(self.table.list().await)
    }

    async fn update(&self, id: i32, update: &OwnerUpdate) -> Result<Option<Owner>, ServiceError> {
        Ok(self
            .table
            .update_with(id, |owner| {
                update.apply_to(owner);
                owner.clone()
            })
            .await)
    }

    async fn set_person_synced(&self, id: i32, synced: bool) -> Result<bool, ServiceError> {
        Ok(self.table.update_with(id, |owner| owner.person_synced = synced).await.is_some())
    }

    async fn list_unsynced(&self) -> Result<Vec<Owner>, ServiceError> {
        Ok(self.table.list_where(|owner| !owner.person_synced).await)
    }
}
