//! OpenAPI documents for the two services. The schema types mirror the
//! wire format of `models` without pulling utoipa into that crate.

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDoc {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
    /// False until the people service holds the matching person.
    pub person_synced: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInputDoc {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    /// Up to 12 digits.
    pub telephone: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerUpdateDoc {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PetTypeDoc {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetDoc {
    pub id: i32,
    pub name: String,
    /// yyyy-MM-dd
    pub birth_date: Option<String>,
    #[serde(rename = "type")]
    pub pet_type: Option<PetTypeDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetDetailsDoc {
    pub id: i32,
    pub name: String,
    pub owner: String,
    pub birth_date: Option<String>,
    #[serde(rename = "type")]
    pub pet_type: Option<PetTypeDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetRequestDoc {
    pub id: i32,
    pub birth_date: Option<String>,
    pub name: String,
    pub type_id: i32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonDoc {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPersonDoc {
    pub first_name: String,
    pub last_name: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::customers_health,
        crate::routes::owners::create_owner,
        crate::routes::owners::find_owner,
        crate::routes::owners::list_owners,
        crate::routes::owners::update_owner,
        crate::routes::owners::list_pet_types,
        crate::routes::owners::create_pet,
        crate::routes::owners::update_pet,
        crate::routes::owners::find_pet,
    ),
    components(
        schemas(
            HealthResponse,
            OwnerDoc,
            OwnerInputDoc,
            OwnerUpdateDoc,
            PetTypeDoc,
            PetDoc,
            PetDetailsDoc,
            PetRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "owners"),
        (name = "pets")
    )
)]
pub struct CustomersApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(crate::routes::people_health, crate::routes::people::list_people, crate::routes::people::create_person),
    components(schemas(HealthResponse, PersonDoc, NewPersonDoc)),
    tags((name = "health"), (name = "people"))
)]
pub struct PeopleApiDoc;
