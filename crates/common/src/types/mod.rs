use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Health {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok".into(), service: None }
    }

    pub fn for_service(name: &str) -> Self {
        Self { status: "ok".into(), service: Some(name.to_string()) }
    }
}
