use domain::models::FilterError;
use persistence::{EmailTaken, StoreError};
use shared::jwt::JwtError;
use shared::password::PasswordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Event is full ({max_attendees} attendees)")]
    CapacityExceeded { max_attendees: u32 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Timed out: {0}")]
    Timeout(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// One failed field of a validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl ApiError {
    /// Stable machine-readable code for the view layer.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::EmailAlreadyRegistered => "email_already_registered",
            ApiError::NotFound(_) => "not_found",
            ApiError::CapacityExceeded { .. } => "capacity_exceeded",
            ApiError::Validation(_) => "validation_error",
            ApiError::WeakPassword(_) => "weak_password",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Timeout(_) => "timeout",
            ApiError::Storage(_) => "storage_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show to an end user. Storage and internal failures
    /// are not described.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Storage(_) | ApiError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            ApiError::Timeout(_) => "The request took too long. Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }
}

/// Flattens field errors, including nested structs and lists, into
/// `path: message` details.
pub fn validation_details(errors: &validator::ValidationErrors) -> Vec<ValidationDetail> {
    use validator::ValidationErrorsKind;

    fn walk(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<ValidationDetail>) {
        for (field, kind) in errors.errors() {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };
            match kind {
                ValidationErrorsKind::Field(field_errors) => {
                    out.extend(field_errors.iter().map(|e| ValidationDetail {
                        field: path.clone(),
                        message: e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string()),
                    }));
                }
                ValidationErrorsKind::Struct(nested) => walk(&path, nested, out),
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        walk(&format!("{}[{}]", path, index), nested, out);
                    }
                }
            }
        }
    }

    let mut details = Vec::new();
    walk("", errors, &mut details);
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = validation_details(&errors);

        let message = match details.len() {
            0 => errors.to_string(),
            1 => details[0].message.clone(),
            _ => details
                .iter()
                .map(|d| d.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        };

        ApiError::Validation(message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Store operation failed");
        match err {
            StoreError::UnknownRecord(key) => ApiError::Internal(format!("Unknown record: {}", key)),
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl From<EmailTaken> for ApiError {
    fn from(_: EmailTaken) -> Self {
        ApiError::EmailAlreadyRegistered
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!(error = %err, "Password hashing failed");
        ApiError::Internal(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Session expired".to_string()),
            JwtError::BadSignature | JwtError::WrongKind { .. } | JwtError::Malformed(_) => {
                ApiError::Unauthorized("Invalid session token".to_string())
            }
            JwtError::Sign(_) | JwtError::WeakSecret(_) | JwtError::BadLifetime => {
                tracing::error!(error = %err, "Token signing failed");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::Validation(err.to_string())
    }
}
