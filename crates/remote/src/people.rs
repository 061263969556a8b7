use async_trait::async_trait;
use models::person::{NewPerson, Person};
use tracing::info;

use crate::client::RemoteClient;
use crate::errors::RemoteError;

/// Calls the customers service makes to the people service.
#[async_trait]
pub trait PeopleApi: Send + Sync {
    /// `POST /people`. Not idempotent, so never retried by the client.
    async fn create_person(&self, person: &NewPerson) -> Result<Person, RemoteError>;
}

pub struct PeopleClient {
    client: RemoteClient,
}

impl PeopleClient {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PeopleApi for PeopleClient {
    async fn create_person(&self, person: &NewPerson) -> Result<Person, RemoteError> {
        let created: Person = self.client.post_json("/people", person).await?;
        info!(person_id = created.id, "person created in people service");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{spawn_server, test_client};
    use axum::{http::StatusCode, routing::post, Json, Router};

    #[tokio::test]
    async fn posts_first_and_last_name() {
        let router = Router::new().route(
            "/people",
            post(|Json(body): Json<NewPerson>| async move {
                let person = Person { id: 11, first_name: body.first_name, last_name: body.last_name };
                (StatusCode::CREATED, Json(person))
            }),
        );
        let base = spawn_server(router).await;
        let people = PeopleClient::new(test_client("people-service", &base, 1, 5));

        let created = people.create_person(&NewPerson::new("Jean", "Coleman")).await.unwrap();
        assert_eq!(created, Person { id: 11, first_name: "Jean".into(), last_name: "Coleman".into() });
    }
}
