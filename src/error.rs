//! Error handler for lynq.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Why a request was rejected with 401.
///
/// Collapsed to the same client-visible status, but each reason keeps its own
/// message and log line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken,
    ExpiredSession,
    BadCredentials,
    NotOwner,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "Unauthorized: token missing.",
            AuthFailure::InvalidToken => "Unauthorized: invalid token.",
            AuthFailure::ExpiredSession => {
                "Your session has expired. Please log in again."
            },
            AuthFailure::BadCredentials => "Invalid email or password.",
            AuthFailure::NotOwner => {
                "Unauthorized: you are not allowed to modify this resource."
            },
        }
    }
}

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} already in use")]
    Conflict(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("unauthorized")]
    Unauthorized(AuthFailure),

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ServerError {
    /// Build an opaque 500 from any error.
    pub fn internal(
        details: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal {
            details: details.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue.to_string(),
            })
        })
        .collect()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => {
                response.errors(validation_errors)
            },

            ServerError::Conflict(field) => response
                .title("Conflict with an existing resource.")
                .details(&format!("This {field} is already in use.")),

            ServerError::NotFound(entity) => response
                .title("Resource not found.")
                .details(&format!("No matching {entity}."))
                .status(StatusCode::NOT_FOUND),

            ServerError::Unauthorized(reason) => {
                tracing::debug!(?reason, "request rejected");
                response
                    .title("Unauthorized.")
                    .details(reason.message())
                    .status(StatusCode::UNAUTHORIZED)
            },

            ServerError::Sql(err) => return sql_error_response(err),

            ServerError::Json(err) => {
                tracing::error!(%err, "serialization failed");
                ResponseError::default()
            },

            ServerError::Internal { details, source } => {
                tracing::error!(err = ?source, %details, "server returned 500 status");

                ResponseError::default()
            },

            _ => response,
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

/// Map database failures onto the public taxonomy: a missing row is a 404, a
/// unique-index conflict is a 400, anything else is an opaque 500.
fn sql_error_response(err: &SQLxError) -> Response {
    let response = match err {
        SQLxError::RowNotFound => ResponseError::default()
            .title("Resource not found.")
            .details("No matching record.")
            .status(StatusCode::NOT_FOUND),
        _ => {
            if err
                .as_database_error()
                .and_then(|e| e.code())
                .is_some_and(|code| code == UNIQUE_VIOLATION)
            {
                ResponseError::default()
                    .title("Conflict with an existing resource.")
                    .details("A record with this value already exists.")
                    .status(StatusCode::BAD_REQUEST)
            } else {
                tracing::error!(%err, "database request failed");
                ResponseError::default()
            }
        },
    };

    response
        .into_response()
        .unwrap_or_else(|_| internal_server_error())
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
