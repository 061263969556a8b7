#![cfg(test)]
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use migration::MigratorTrait;
use models::db::connect_from_env;
use models::owner::OwnerInput;
use models::person::{NewPerson, Person};
use models::pets::{Pet, PetDetails, PetRequest, PetType};
use remote::{PeopleApi, PetsApi, RemoteError};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Fresh connection to the test database, or `None` when `DATABASE_URL` is unset.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    if std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_from_env().await?;
            migration::CustomersMigrator::up(&db, None).await?;
            migration::PeopleMigrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;
    Ok(Some(connect_from_env().await?))
}

pub fn jean_coleman() -> OwnerInput {
    OwnerInput {
        first_name: "Jean".into(),
        last_name: "Coleman".into(),
        address: "105 N. Lake St.".into(),
        city: "Monona".into(),
        telephone: "6085552654".into(),
    }
}

pub fn unreachable(service: &str) -> RemoteError {
    RemoteError::Unreachable { service: service.into(), message: "connection refused".into() }
}

pub fn rejected(service: &str, status: u16) -> RemoteError {
    RemoteError::Rejected { service: service.into(), status, body: String::new() }
}

/// People service double. Pops one scripted failure per call, succeeds once the script is empty.
#[derive(Default)]
pub struct FakePeople {
    calls: AtomicUsize,
    failures: Mutex<VecDeque<RemoteError>>,
    created: Mutex<Vec<NewPerson>>,
}

impl FakePeople {
    pub fn failing_with(errors: impl IntoIterator<Item = RemoteError>) -> Self {
        Self { failures: Mutex::new(errors.into_iter().collect()), ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<NewPerson> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PeopleApi for FakePeople {
    async fn create_person(&self, person: &NewPerson) -> Result<Person, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let mut created = self.created.lock().unwrap();
        created.push(person.clone());
        Ok(Person {
            id: created.len() as i32,
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
        })
    }
}

/// Pets service double holding a fixed set of pet types and pets.
#[derive(Default)]
pub struct FakePets {
    pub types: Vec<PetType>,
    pub pets: Vec<PetDetails>,
    pub fail_with: Option<RemoteError>,
    type_calls: AtomicUsize,
    updates: Mutex<Vec<(i32, PetRequest)>>,
}

impl FakePets {
    pub fn with_types() -> Self {
        Self {
            types: vec![
                PetType { id: 1, name: "cat".into() },
                PetType { id: 2, name: "dog".into() },
                PetType { id: 3, name: "lizard".into() },
            ],
            pets: vec![PetDetails {
                id: 7,
                name: "Samantha".into(),
                owner: "Jean Coleman".into(),
                birth_date: chrono::NaiveDate::from_ymd_opt(2012, 9, 4),
                pet_type: Some(PetType { id: 1, name: "cat".into() }),
            }],
            ..Default::default()
        }
    }

    pub fn failing(err: RemoteError) -> Self {
        Self { fail_with: Some(err), ..Default::default() }
    }

    pub fn type_calls(&self) -> usize {
        self.type_calls.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<(i32, PetRequest)> {
        self.updates.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), RemoteError> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PetsApi for FakePets {
    async fn list_pet_types(&self) -> Result<Vec<PetType>, RemoteError> {
        self.type_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.types.clone())
    }

    async fn create_pet(&self, owner_id: i32, pet: &PetRequest) -> Result<Pet, RemoteError> {
        self.check()?;
        Ok(Pet {
            id: 100 + owner_id,
            name: pet.name.clone(),
            birth_date: pet.birth_date,
            pet_type: self.types.iter().find(|t| t.id == pet.type_id).cloned(),
        })
    }

    async fn update_pet(&self, pet_id: i32, pet: &PetRequest) -> Result<(), RemoteError> {
        self.check()?;
        self.updates.lock().unwrap().push((pet_id, pet.clone()));
        Ok(())
    }

    async fn find_pet(&self, pet_id: i32) -> Result<Option<PetDetails>, RemoteError> {
        self.check()?;
        Ok(self.pets.iter().find(|p| p.id == pet_id).cloned())
    }
}
