use axum::{extract::State, http::StatusCode, Json};
use models::person::{NewPerson, Person};

use crate::{errors::JsonApiError, routes::PeopleState};

#[utoipa::path(
    get, path = "/people", tag = "people",
    responses((status = 200, description = "All people", body = [crate::openapi::PersonDoc]))
)]
pub async fn list_people(State(state): State<PeopleState>) -> Result<Json<Vec<Person>>, JsonApiError> {
    Ok(Json(state.people.list_people().await?))
}

#[utoipa::path(
    post, path = "/people", tag = "people",
    request_body = crate::openapi::NewPersonDoc,
    responses(
        (status = 201, description = "Person created", body = crate::openapi::PersonDoc),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create_person(
    State(state): State<PeopleState>,
    Json(person): Json<NewPerson>,
) -> Result<(StatusCode, Json<Person>), JsonApiError> {
    let created = state.people.create_person(person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
