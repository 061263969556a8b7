use thiserror::Error;

/// Failure of a call to a dependency, one variant per observable kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("{service} unreachable: {message}")]
    Unreachable { service: String, message: String },
    #[error("{service} timed out: {message}")]
    Timeout { service: String, message: String },
    #[error("{service} rejected request with status {status}")]
    Rejected { service: String, status: u16, body: String },
    #[error("{service} returned a malformed response: {message}")]
    Malformed { service: String, message: String },
    #[error("{service} circuit is open, failing fast")]
    CircuitOpen { service: String },
    #[error("cannot encode request for {service}: {message}")]
    Encode { service: String, message: String },
    #[error("invalid configuration for {service}: {message}")]
    InvalidConfig { service: String, message: String },
}

impl RemoteError {
    pub fn service(&self) -> &str {
        match self {
            Self::Unreachable { service, .. }
            | Self::Timeout { service, .. }
            | Self::Rejected { service, .. }
            | Self::Malformed { service, .. }
            | Self::CircuitOpen { service }
            | Self::Encode { service, .. }
            | Self::InvalidConfig { service, .. } => service,
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "unreachable",
            Self::Timeout { .. } => "timeout",
            Self::Rejected { .. } => "rejected",
            Self::Malformed { .. } => "malformed",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::Encode { .. } => "encode",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Transport failures and gateway-style statuses may succeed on a second try.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => true,
            Self::Rejected { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Whether the dependency itself looks unhealthy. 4xx answers do not count.
    pub fn counts_against_circuit(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Worth retrying later from a background task (open circuits close again).
    pub fn is_transient(&self) -> bool {
        self.is_retryable() || matches!(self, Self::CircuitOpen { .. }) || self.status().is_some_and(|s| s >= 500)
    }
}
