use models::errors::ModelError;
use remote::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("dependency {service} unreachable: {message}")]
    DependencyUnreachable { service: String, message: String },
    #[error("dependency {service} timed out: {message}")]
    DependencyTimeout { service: String, message: String },
    #[error("dependency {service} rejected the request with status {status}")]
    DependencyRejected { service: String, status: u16 },
    #[error("dependency {service} returned a malformed response: {message}")]
    MalformedResponse { service: String, message: String },
    #[error("database error: {0}")]
    Db(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self {
        Self::NotFound(format!("{} {} not found", entity, id))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::Validation(msg),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Db(e.to_string())
    }
}

impl From<RemoteError> for ServiceError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Unreachable { service, message } => Self::DependencyUnreachable { service, message },
            RemoteError::CircuitOpen { service } => Self::DependencyUnreachable {
                service,
                message: "circuit open".into(),
            },
            RemoteError::Timeout { service, message } => Self::DependencyTimeout { service, message },
            RemoteError::Rejected { service, status, .. } => Self::DependencyRejected { service, status },
            RemoteError::Malformed { service, message } => Self::MalformedResponse { service, message },
            e @ (RemoteError::Encode { .. } | RemoteError::InvalidConfig { .. }) => Self::Internal(e.to_string()),
        }
    }
}
