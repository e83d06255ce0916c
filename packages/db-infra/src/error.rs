use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbInfraError {
    #[error("Configuration error: {message}")]
    Config { message: String },
    #[error("Connection error: {message}")]
    Connection { message: String },
    #[error("Query error: {message}")]
    Query { message: String },
}

impl DbInfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Config { message } | Self::Connection { message } | Self::Query { message } => {
                message
            }
        }
    }
}

/// Pool checkout and connect failures are connection errors; everything the
/// database reports after a statement was sent is a query error.
impl From<DbErr> for DbInfraError {
    fn from(e: DbErr) -> Self {
        match e {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Connection {
                message: e.to_string(),
            },
            other => Self::Query {
                message: other.to_string(),
            },
        }
    }
}
