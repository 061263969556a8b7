//! Wire types of the pets service. The customers service only forwards
//! them and never stores a copy.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetType {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub pet_type: Option<PetType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetDetails {
    pub id: i32,
    pub name: String,
    /// Display name of the owner, e.g. "Jean Coleman".
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub pet_type: Option<PetType>,
}

/// Create/update payload forwarded as-is to the pets service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRequest {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub type_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_details_wire_format() {
        let body = r#"{"id":7,"name":"Samantha","owner":"Jean Coleman","birthDate":"2012-09-04","type":{"id":1,"name":"cat"}}"#;
        let details: PetDetails = serde_json::from_str(body).unwrap();
        assert_eq!(details.birth_date, NaiveDate::from_ymd_opt(2012, 9, 4));
        assert_eq!(details.pet_type.as_ref().map(|t| t.name.as_str()), Some("cat"));
        let back = serde_json::to_value(&details).unwrap();
        assert_eq!(back["type"]["id"], 1);
        assert_eq!(back["birthDate"], "2012-09-04");
    }
}
