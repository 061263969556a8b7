use std::sync::Arc;

use models::person::{NewPerson, Person};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::people::repository::PersonRepository;

/// Logic behind the people service's own endpoints.
#[derive(Clone)]
pub struct PeopleService {
    repo: Arc<dyn PersonRepository>,
}

impl PeopleService {
    pub fn new(repo: Arc<dyn PersonRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_people(&self) -> Result<Vec<Person>, ServiceError> {
        self.repo.list().await
    }

    #[instrument(skip(self, person))]
    pub async fn create_person(&self, person: NewPerson) -> Result<Person, ServiceError> {
        person.validate()?;
        let created = self.repo.insert(&person).await?;
        info!(person_id = created.id, "person saved");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::people::repository::InMemoryPersonRepository;

    #[tokio::test]
    async fn create_then_list_in_id_order() {
        let service = PeopleService::new(Arc::new(InMemoryPersonRepository::new()));
        let george = service.create_person(NewPerson::new("George", "Franklin")).await.unwrap();
        let betty = service.create_person(NewPerson::new("Betty", "Davis")).await.unwrap();

        assert!(george.id < betty.id);
        assert_eq!(service.list_people().await.unwrap(), vec![george, betty]);
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let service = PeopleService::new(Arc::new(InMemoryPersonRepository::new()));
        let err = service.create_person(NewPerson::new("", "Davis")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(service.list_people().await.unwrap().is_empty());
    }
}
