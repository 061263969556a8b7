use async_trait::async_trait;
use models::person::{self, NewPerson, Person};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, QueryOrder, Set};

use crate::errors::ServiceError;
use crate::storage::MemoryTable;

#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn insert(&self, person: &NewPerson) -> Result<Person, ServiceError>;
    /// All people in id order.
    async fn list(&self) -> Result<Vec<Person>, ServiceError>;
}

pub struct SeaOrmPersonRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPersonRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersonRepository for SeaOrmPersonRepository {
    async fn insert(&self, person: &NewPerson) -> Result<Person, ServiceError> {
        let am = person::ActiveModel {
            id: NotSet,
            first_name: Set(person.first_name.clone()),
            last_name: Set(person.last_name.clone()),
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn list(&self) -> Result<Vec<Person>, ServiceError> {
        Ok(person::Entity::find().order_by_asc(person::Column::Id).all(&self.db).await?)
    }
}

#[derive(Default)]
pub struct InMemoryPersonRepository {
    table: MemoryTable<Person>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn insert(&self, person: &NewPerson) -> Result<Person, ServiceError> {
        self.table
            .insert_with(|id| Person { id, first_name: person.first_name.clone(), last_name: person.last_name.clone() })
            .await
    }

    async fn list(&self) -> Result<Vec<Person>, ServiceError> {
        Ok(self.table.list().await)
    }
}
