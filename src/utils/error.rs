use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RaffleError {
    #[error("No eligible participants for the draw")]
    NoEligibleParticipants,

    #[error("Notification failed: {message}")]
    NotificationFailure { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Email already registered: {email}")]
    DuplicateEmail { email: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Winner {id} was already notified")]
    AlreadyNotified { id: Uuid },

    #[error("Token error: {message}")]
    TokenError { message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl RaffleError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// HTTP status used when the error leaves the API.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoEligibleParticipants
            | Self::ValidationError { .. }
            | Self::InvalidToken { .. } => 400,
            Self::Unauthorized { .. } | Self::TokenError { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::DuplicateEmail { .. } | Self::AlreadyNotified { .. } => 409,
            Self::NotificationFailure { .. } | Self::ApiError(_) => 502,
            Self::DatabaseError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => 500,
        }
    }

    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoEligibleParticipants => "no_eligible_participants",
            Self::NotificationFailure { .. } => "notification_failure",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::ValidationError { .. } => "validation_error",
            Self::InvalidToken { .. } => "invalid_token",
            Self::DuplicateEmail { .. } => "duplicate_email",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyNotified { .. } => "already_notified",
            Self::TokenError { .. } => "invalid_credentials",
            Self::DatabaseError(_) => "database_error",
            Self::ApiError(_) => "upstream_error",
            Self::IoError(_) | Self::SerializationError(_) => "internal_error",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "config_error",
        }
    }

    /// Message safe to show to end users. Internal failures are not leaked.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NoEligibleParticipants => {
                "There are no eligible participants for the draw.".to_string()
            }
            Self::Unauthorized { .. } | Self::TokenError { .. } => {
                "Authentication credentials were missing or invalid.".to_string()
            }
            Self::Forbidden { message } => message.clone(),
            Self::ValidationError { field, message } => format!("{field}: {message}"),
            Self::InvalidToken { message } => message.clone(),
            Self::DuplicateEmail { .. } => {
                "This email address is already registered in the raffle.".to_string()
            }
            Self::NotFound { entity, .. } => format!("{entity} not found."),
            Self::AlreadyNotified { .. } => {
                "This winner has already been notified.".to_string()
            }
            Self::NotificationFailure { .. } | Self::ApiError(_) => {
                "The notification email could not be sent.".to_string()
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => self.to_string(),
            Self::DatabaseError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                "Internal server error.".to_string()
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, RaffleError>;
