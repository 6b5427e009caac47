use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid location: {reason}")]
    InvalidLocation { reason: String },

    #[error("Agent not found: {id}")]
    AgentNotFound { id: String },

    #[error("Route unavailable: {reason}")]
    RouteUnavailable { reason: String },

    #[error("Change feed disconnected: {table}")]
    FeedDisconnected { table: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Data store error: {0}")]
    DataStore(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
