//! Local owner records of the customers service.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, validate};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "owners")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
    /// False while the people service has not yet recorded this owner.
    pub person_synced: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub type Owner = Model;

/// Body of `POST /owners`. An `id` sent by the client is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub telephone: String,
}

impl OwnerInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::not_blank("firstName", &self.first_name)?;
        validate::max_len("firstName", &self.first_name, 30)?;
        validate::not_blank("lastName", &self.last_name)?;
        validate::max_len("lastName", &self.last_name, 30)?;
        validate::not_blank("address", &self.address)?;
        validate::max_len("address", &self.address, 255)?;
        validate::not_blank("city", &self.city)?;
        validate::max_len("city", &self.city, 80)?;
        validate::telephone(&self.telephone)
    }
}

/// Body of `PUT /owners/{id}`: only the fields present are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub telephone: Option<String>,
}

impl OwnerUpdate {
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(v) = &self.first_name {
            validate::not_blank("firstName", v)?;
            validate::max_len("firstName", v, 30)?;
        }
        if let Some(v) = &self.last_name {
            validate::not_blank("lastName", v)?;
            validate::max_len("lastName", v, 30)?;
        }
        if let Some(v) = &self.address {
            validate::not_blank("address", v)?;
            validate::max_len("address", v, 255)?;
        }
        if let Some(v) = &self.city {
            validate::not_blank("city", v)?;
            validate::max_len("city", v, 80)?;
        }
        if let Some(v) = &self.telephone {
            validate::telephone(v)?;
        }
        Ok(())
    }

    /// Merge the allowlisted fields into `owner`. Absent fields stay as they are.
    pub fn apply_to(&self, owner: &mut Owner) {
        if let Some(v) = &self.first_name { owner.first_name = v.clone(); }
        if let Some(v) = &self.last_name { owner.last_name = v.clone(); }
        if let Some(v) = &self.address { owner.address = v.clone(); }
        if let Some(v) = &self.city { owner.city = v.clone(); }
        if let Some(v) = &self.telephone { owner.telephone = v.clone(); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jean() -> OwnerInput {
        OwnerInput {
            first_name: "Jean".into(),
            last_name: "Coleman".into(),
            address: "105 N. Lake St.".into(),
            city: "Monona".into(),
            telephone: "6085552654".into(),
        }
    }

    #[test]
    fn input_validation() {
        assert!(jean().validate().is_ok());
        let mut bad = jean();
        bad.city = " ".into();
        assert!(matches!(bad.validate(), Err(ModelError::Validation(_))));
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut owner = Owner {
            id: 1,
            first_name: "Jean".into(),
            last_name: "Coleman".into(),
            address: "105 N. Lake St.".into(),
            city: "Monona".into(),
            telephone: "6085552654".into(),
            person_synced: true,
        };
        let update = OwnerUpdate { city: Some("Madison".into()), ..Default::default() };
        update.apply_to(&mut owner);
        assert_eq!(owner.city, "Madison");
        assert_eq!(owner.first_name, "Jean");
        assert_eq!(owner.telephone, "6085552654");
    }

    #[test]
    fn owner_serializes_camel_case() {
        let json = serde_json::json!({
            "firstName": "Jean", "lastName": "Coleman", "address": "a", "city": "c", "telephone": "1"
        });
        let input: OwnerInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.first_name, "Jean");
        let update: OwnerUpdate = serde_json::from_str(r#"{"telephone":"123"}"#).unwrap();
        assert_eq!(update.telephone.as_deref(), Some("123"));
        assert!(update.first_name.is_none());
    }
}
