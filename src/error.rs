use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification callers branch on; the wire code is finer grained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    ValidationFailure,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("team '{0}' already exists")]
    TeamExists(String),

    #[error("pull request '{0}' already exists")]
    PrExists(String),

    #[error("pull request '{0}' is merged and cannot be modified")]
    PrMerged(String),

    #[error("user '{user_id}' is not assigned as reviewer to PR '{pr_id}'")]
    NotAssigned { user_id: String, pr_id: String },

    #[error("user '{user_id}' is already assigned as reviewer to PR '{pr_id}'")]
    AlreadyAssigned { user_id: String, pr_id: String },

    #[error("no active replacement candidate available in team '{0}'")]
    NoCandidate(String),

    #[error("user {user_id} is not in team {team_name}")]
    NotInTeam { user_id: String, team_name: String },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn team_not_found(team_name: impl Into<String>) -> Self {
        Error::NotFound {
            resource: "team",
            id: team_name.into(),
        }
    }

    pub fn user_not_found(user_id: impl Into<String>) -> Self {
        Error::NotFound {
            resource: "user",
            id: user_id.into(),
        }
    }

    pub fn pr_not_found(pr_id: impl Into<String>) -> Self {
        Error::NotFound {
            resource: "pull request",
            id: pr_id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::PrExists(_)
            | Error::PrMerged(_)
            | Error::NotAssigned { .. }
            | Error::AlreadyAssigned { .. }
            | Error::NoCandidate(_)
            | Error::TeamExists(_) => ErrorKind::Conflict,
            Error::NotInTeam { .. } | Error::Validation(_) | Error::BadRequest(_) => {
                ErrorKind::ValidationFailure
            }
            _ => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NOT_FOUND",
            Error::TeamExists(_) => "TEAM_EXISTS",
            Error::PrExists(_) => "PR_EXISTS",
            Error::PrMerged(_) => "PR_MERGED",
            Error::NotAssigned { .. } => "NOT_ASSIGNED",
            Error::AlreadyAssigned { .. } => "ALREADY_ASSIGNED",
            Error::NoCandidate(_) => "NO_CANDIDATE",
            Error::NotInTeam { .. } => "VALIDATION_FAILED",
            Error::Validation(_) | Error::BadRequest(_) => "INVALID_REQUEST",
            _ => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            // Kept from the public API: a duplicate team is a 400, not a 409.
            Error::TeamExists(_) => StatusCode::BAD_REQUEST,
            _ => match self.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            Error::Database(_) | Error::Migrate(_) | Error::Config(_) => {
                tracing::error!(error = %self, "request failed");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err)
    }
}
