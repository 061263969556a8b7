//! Person records owned by the people service. The same shape is the wire
//! format the customers service receives from `POST /people`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, validate};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "people")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub type Person = Model;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl NewPerson {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self { first_name: first_name.into(), last_name: last_name.into() }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate::not_blank("firstName", &self.first_name)?;
        validate::max_len("firstName", &self.first_name, 30)?;
        validate::not_blank("lastName", &self.last_name)?;
        validate::max_len("lastName", &self.last_name, 30)
    }
}

impl From<&crate::owner::Owner> for NewPerson {
    fn from(owner: &crate::owner::Owner) -> Self {
        Self::new(owner.first_name.clone(), owner.last_name.clone())
    }
}

impl From<&crate::owner::OwnerInput> for NewPerson {
    fn from(input: &crate::owner::OwnerInput) -> Self {
        Self::new(input.first_name.clone(), input.last_name.clone())
    }
}
