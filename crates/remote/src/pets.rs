use async_trait::async_trait;
use models::pets::{Pet, PetDetails, PetRequest, PetType};

use crate::client::RemoteClient;
use crate::errors::RemoteError;

/// Calls the customers service forwards to the pets service.
#[async_trait]
pub trait PetsApi: Send + Sync {
    async fn list_pet_types(&self) -> Result<Vec<PetType>, RemoteError>;
    async fn create_pet(&self, owner_id: i32, pet: &PetRequest) -> Result<Pet, RemoteError>;
    async fn update_pet(&self, pet_id: i32, pet: &PetRequest) -> Result<(), RemoteError>;
    /// `None` when the pets service has no such pet.
    async fn find_pet(&self, pet_id: i32) -> Result<Option<PetDetails>, RemoteError>;
}

pub struct PetsClient {
    client: RemoteClient,
}

impl PetsClient {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PetsApi for PetsClient {
    async fn list_pet_types(&self) -> Result<Vec<PetType>, RemoteError> {
        self.client.get_json("/petTypes").await
    }

    async fn create_pet(&self, owner_id: i32, pet: &PetRequest) -> Result<Pet, RemoteError> {
        self.client.post_json(&format!("/owners/{owner_id}/pets"), pet).await
    }

    async fn update_pet(&self, pet_id: i32, pet: &PetRequest) -> Result<(), RemoteError> {
        self.client.put_json(&format!("/pets/{pet_id}"), pet).await
    }

    async fn find_pet(&self, pet_id: i32) -> Result<Option<PetDetails>, RemoteError> {
        self.client.get_optional(&format!("/pets/{pet_id}")).await
    }
}
