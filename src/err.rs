use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use serde::Serialize;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

const INTERNAL_MESSAGE: &str = "an internal error occurred";

pub async fn handler404(path: Uri) -> Error {
    Error::NotFound {
        message: format!("Invalid path: {}", path),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "error")]
pub enum Error {
    ValidationError { message: String },
    NotFound { message: String },
    ConstraintViolation { message: String },
    InternalError { kind: &'static str, message: String },
}

impl Error {
    pub fn validation<S: Into<String>>(msg: S) -> Error {
        Error::ValidationError {
            message: msg.into(),
        }
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Error {
        Error::NotFound {
            message: msg.into(),
        }
    }

    /// Logs `detail` and hides it from the caller.
    pub fn internal(kind: &'static str, detail: &str) -> Error {
        log::error!("{}: {}", kind, detail);
        Error::InternalError {
            kind,
            message: INTERNAL_MESSAGE.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::ValidationError { message }
            | Error::NotFound { message }
            | Error::ConstraintViolation { message }
            | Error::InternalError { message, .. } => message,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::ConstraintViolation { .. } => StatusCode::CONFLICT,
            Error::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classifies a database error by its SQLSTATE code.
    pub fn from_sql_state(code: Option<&str>, message: &str) -> Error {
        match code {
            Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => Error::ConstraintViolation {
                message: message.to_string(),
            },
            Some(NOT_NULL_VIOLATION) | Some(STRING_DATA_RIGHT_TRUNCATION) => {
                Error::validation(message)
            }
            _ => Error::internal("DatabaseError", message),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::not_found("Requested record does not exist"),
            sqlx::Error::Database(db) => Error::from_sql_state(db.code().as_deref(), db.message()),
            other => Error::internal("DatabaseError", &other.to_string()),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::validation(rejection.to_string())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::not_found(rejection.to_string())
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Self {
        Error::validation(format!("Dates must be formatted as YYYY-MM-DD: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(Error::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::ConstraintViolation {
                message: "x".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::InternalError {
                kind: "DatabaseError",
                message: "x".into()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn sql_states_map_to_taxonomy() {
        assert!(matches!(
            Error::from_sql_state(Some("23505"), "duplicate key"),
            Error::ConstraintViolation { .. }
        ));
        assert!(matches!(
            Error::from_sql_state(Some("23503"), "violates foreign key"),
            Error::ConstraintViolation { .. }
        ));
        assert!(matches!(
            Error::from_sql_state(Some("22001"), "value too long"),
            Error::ValidationError { .. }
        ));
        assert!(matches!(
            Error::from_sql_state(None, "connection reset"),
            Error::InternalError {
                kind: "DatabaseError",
                ..
            }
        ));
    }

    #[test]
    fn serializes_with_error_tag_and_message() {
        let body = serde_json::to_value(Error::not_found("Student `7` does not exist")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": "NotFound",
                "message": "Student `7` does not exist"
            })
        );
    }

    #[test]
    fn internal_errors_hide_database_detail() {
        let err = Error::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "an internal error occurred");

        let err = Error::from_sql_state(Some("08006"), "connection to db.internal:5432 failed");
        assert!(!err.message().contains("db.internal"));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "error": "InternalError",
                "kind": "DatabaseError",
                "message": "an internal error occurred"
            })
        );
    }

    #[test]
    fn row_not_found_is_not_found() {
        assert!(matches!(
            Error::from(sqlx::Error::RowNotFound),
            Error::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn fallback_reports_path() {
        let err = handler404(Uri::from_static("/nowhere")).await;
        assert_eq!(err, Error::not_found("Invalid path: /nowhere"));
    }
}
