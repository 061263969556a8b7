use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::owner::{Owner, OwnerInput, OwnerUpdate};
use models::pets::{Pet, PetDetails, PetRequest, PetType};
use service::errors::ServiceError;

use crate::{errors::JsonApiError, routes::CustomersState};

#[utoipa::path(
    post, path = "/owners", tag = "owners",
    request_body = crate::openapi::OwnerInputDoc,
    responses(
        (status = 201, description = "Owner created", body = crate::openapi::OwnerDoc),
        (status = 400, description = "Validation Error"),
        (status = 502, description = "People service unavailable"),
        (status = 504, description = "People service timed out")
    )
)]
pub async fn create_owner(
    State(state): State<CustomersState>,
    Json(input): Json<OwnerInput>,
) -> Result<(StatusCode, Json<Owner>), JsonApiError> {
    let owner = state.owners.create_owner(input).await?;
    Ok((StatusCode::CREATED, Json(owner)))
}

/// Unknown ids answer 200 with a `null` body, as existing clients expect.
#[utoipa::path(
    get, path = "/owners/{id}", tag = "owners",
    params(("id" = i32, Path, description = "Owner id")),
    responses((status = 200, description = "Owner, or null when unknown", body = crate::openapi::OwnerDoc))
)]
pub async fn find_owner(
    State(state): State<CustomersState>,
    Path(id): Path<i32>,
) -> Result<Json<Option<Owner>>, JsonApiError> {
    match state.owners.find_owner(id).await {
        Ok(owner) => Ok(Json(Some(owner))),
        Err(ServiceError::NotFound(_)) => Ok(Json(None)),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get, path = "/owners", tag = "owners",
    responses((status = 200, description = "All owners", body = [crate::openapi::OwnerDoc]))
)]
pub async fn list_owners(State(state): State<CustomersState>) -> Result<Json<Vec<Owner>>, JsonApiError> {
    Ok(Json(state.owners.list_owners().await?))
}

#[utoipa::path(
    put, path = "/owners/{id}", tag = "owners",
    params(("id" = i32, Path, description = "Owner id")),
    request_body = crate::openapi::OwnerUpdateDoc,
    responses(
        (status = 204, description = "Owner updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_owner(
    State(state): State<CustomersState>,
    Path(id): Path<i32>,
    Json(update): Json<OwnerUpdate>,
) -> Result<StatusCode, JsonApiError> {
    state.owners.update_owner(id, update).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/owners/petTypes", tag = "pets",
    responses(
        (status = 200, description = "Pet types from the pets service", body = [crate::openapi::PetTypeDoc]),
        (status = 502, description = "Pets service unavailable")
    )
)]
pub async fn list_pet_types(State(state): State<CustomersState>) -> Result<Json<Vec<PetType>>, JsonApiError> {
    Ok(Json(state.owners.list_pet_types().await?))
}

#[utoipa::path(
    post, path = "/owners/owners/{owner_id}/pets", tag = "pets",
    params(("owner_id" = i32, Path, description = "Owner id")),
    request_body = crate::openapi::PetRequestDoc,
    responses(
        (status = 201, description = "Pet created in the pets service", body = crate::openapi::PetDoc),
        (status = 502, description = "Pets service unavailable")
    )
)]
pub async fn create_pet(
    State(state): State<CustomersState>,
    Path(owner_id): Path<i32>,
    Json(pet): Json<PetRequest>,
) -> Result<(StatusCode, Json<Pet>), JsonApiError> {
    let created = state.owners.create_pet_for_owner(owner_id, pet).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// The owner segment is accepted but not used; pets are addressed by id.
#[utoipa::path(
    put, path = "/owners/owners/{owner_id}/pets/{pet_id}", tag = "pets",
    params(
        ("owner_id" = String, Path, description = "Ignored"),
        ("pet_id" = i32, Path, description = "Pet id")
    ),
    request_body = crate::openapi::PetRequestDoc,
    responses(
        (status = 204, description = "Pet updated"),
        (status = 502, description = "Pets service unavailable")
    )
)]
pub async fn update_pet(
    State(state): State<CustomersState>,
    Path((_owner, pet_id)): Path<(String, i32)>,
    Json(pet): Json<PetRequest>,
) -> Result<StatusCode, JsonApiError> {
    state.owners.update_pet_for_owner(pet_id, pet).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/owners/owners/{owner_id}/pets/{pet_id}", tag = "pets",
    params(
        ("owner_id" = String, Path, description = "Ignored"),
        ("pet_id" = i32, Path, description = "Pet id")
    ),
    responses(
        (status = 200, description = "Pet details", body = crate::openapi::PetDetailsDoc),
        (status = 404, description = "Not Found"),
        (status = 502, description = "Pets service unavailable")
    )
)]
pub async fn find_pet(
    State(state): State<CustomersState>,
    Path((_owner, pet_id)): Path<(String, i32)>,
) -> Result<Json<PetDetails>, JsonApiError> {
    Ok(Json(state.owners.find_pet(pet_id).await?))
}
