use std::sync::Arc;
use std::time::Duration;

use configs::PersonSyncPolicy;
use models::owner::{Owner, OwnerInput, OwnerUpdate};
use models::person::NewPerson;
use models::pets::{Pet, PetDetails, PetRequest, PetType};
use moka::future::Cache;
use remote::{PeopleApi, PetsApi};
use tracing::{error, info, instrument, warn};

use crate::errors::ServiceError;
use crate::owners::repository::OwnerRepository;
use crate::owners::sync::PersonSyncHandle;

/// Orchestrates owner operations across the local store, the people
/// service and the pets service.
///
/// Owner creation calls the people service first and decides what to
/// persist from its outcome:
/// - `Strict`: a failed person call fails the request and nothing is stored.
/// - `Deferred`: on a transient failure the owner is stored with
///   `person_synced = false` and handed to the person sync worker.
#[derive(Clone)]
pub struct OwnerService {
    repo: Arc<dyn OwnerRepository>,
    people: Arc<dyn PeopleApi>,
    pets: Arc<dyn PetsApi>,
    sync: Option<PersonSyncHandle>,
    pet_types: Option<Cache<(), Arc<Vec<PetType>>>>,
}

impl OwnerService {
    /// Strict policy, no pet type cache.
    pub fn new(repo: Arc<dyn OwnerRepository>, people: Arc<dyn PeopleApi>, pets: Arc<dyn PetsApi>) -> Self {
        Self { repo, people, pets, sync: None, pet_types: None }
    }

    /// Switch to the deferred policy, handing failed person calls to `sync`.
    pub fn with_deferred_sync(mut self, sync: PersonSyncHandle) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn with_pet_types_cache(mut self, ttl: Duration) -> Self {
        self.pet_types = Some(Cache::builder().max_capacity(1).time_to_live(ttl).build());
        self
    }

    pub fn policy(&self) -> PersonSyncPolicy {
        if self.sync.is_some() { PersonSyncPolicy::Deferred } else { PersonSyncPolicy::Strict }
    }

    pub fn repository(&self) -> &Arc<dyn OwnerRepository> {
        &self.repo
    }

    #[instrument(skip(self, input), fields(policy = ?self.policy()))]
    pub async fn create_owner(&self, input: OwnerInput) -> Result<Owner, ServiceError> {
        input.validate()?;
        let person = NewPerson::from(&input);

        match self.people.create_person(&person).await {
            Ok(created) => {
                info!(person_id = created.id, "saving owner after person created");
                self.repo.insert(&input, true).await.map_err(|e| {
                    // The person exists without its owner; the people service has no delete to compensate with.
                    error!(person_id = created.id, error = %e, "owner insert failed after person was created");
                    e
                })
            }
            Err(remote_err) => match &self.sync {
                Some(sync) if remote_err.is_transient() => {
                    let owner = self.repo.insert(&input, false).await?;
                    warn!(owner_id = owner.id, error = %remote_err, "people service failed, owner saved pending person sync");
                    sync.enqueue(owner.id, person);
                    Ok(owner)
                }
                _ => {
                    warn!(error = %remote_err, kind = remote_err.kind(), "people service failed, owner not saved");
                    Err(remote_err.into())
                }
            },
        }
    }

    #[instrument(skip(self))]
    pub async fn find_owner(&self, id: i32) -> Result<Owner, ServiceError> {
        self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("owner", id))
    }

    pub async fn list_owners(&self) -> Result<Vec<Owner>, ServiceError> {
        self.repo.list().await
    }

    /// Merge the present fields into owner `id`. Unknown ids fail with `NotFound`.
    #[instrument(skip(self, update))]
    pub async fn update_owner(&self, id: i32, update: OwnerUpdate) -> Result<(), ServiceError> {
        update.validate()?;
        let saved = self.repo.update(id, &update).await?.ok_or_else(|| ServiceError::not_found("owner", id))?;
        info!(owner_id = saved.id, "owner saved");
        Ok(())
    }

    pub async fn list_pet_types(&self) -> Result<Vec<PetType>, ServiceError> {
        let Some(cache) = &self.pet_types else {
            return Ok(self.pets.list_pet_types().await?);
        };
        if let Some(hit) = cache.get(&()).await {
            return Ok(hit.as_ref().clone());
        }
        let types = Arc::new(self.pets.list_pet_types().await?);
        cache.insert((), Arc::clone(&types)).await;
        Ok(types.as_ref().clone())
    }

    #[instrument(skip(self, pet))]
    pub async fn create_pet_for_owner(&self, owner_id: i32, pet: PetRequest) -> Result<Pet, ServiceError> {
        let created = self.pets.create_pet(owner_id, &pet).await?;
        info!(pet_id = created.id, "pet saved in pets service");
        Ok(created)
    }

    #[instrument(skip(self, pet))]
    pub async fn update_pet_for_owner(&self, pet_id: i32, pet: PetRequest) -> Result<(), ServiceError> {
        Ok(self.pets.update_pet(pet_id, &pet).await?)
    }

    #[instrument(skip(self))]
    pub async fn find_pet(&self, pet_id: i32) -> Result<PetDetails, ServiceError> {
        self.pets.find_pet(pet_id).await?.ok_or_else(|| ServiceError::not_found("pet", pet_id))
    }
}
