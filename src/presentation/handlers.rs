use crate::application::service::UserService;
use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{CreateUser, UpdateUser, User};
use crate::domain::validation::{FieldError, validate_create, validate_update};
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// AppState holding the service; the pool inside the repository is the only
// resource concurrent requests contend for.
pub struct AppState<R: UserRepository> {
    pub service: UserService<R>,
}

// Response envelopes.

#[derive(Serialize)]
struct ListEnvelope {
    code: i32,
    data: Vec<User>,
    description: String,
}

#[derive(Serialize)]
struct AckEnvelope {
    code: i32,
    message: String,
}

#[derive(Serialize)]
struct ValidationEnvelope {
    code: i32,
    errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct OpaqueError {
    message: String,
}

/// Everything a handler can answer with besides success. The variant decides
/// both the status code and the body shape: validation failures carry the
/// structured error list, datastore failures stay opaque to the caller.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => {
                actix_web::http::StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Database(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => {
                warn!(status = %status, errors = ?errors, "Request failed validation");
                HttpResponse::build(status).json(ValidationEnvelope {
                    code: 400,
                    errors: errors.clone(),
                })
            }
            ApiError::BadRequest(message) => {
                warn!(status = %status, message = %message, "Bad request");
                HttpResponse::build(status).json(AckEnvelope {
                    code: 400,
                    message: message.clone(),
                })
            }
            ApiError::NotFound(message) => {
                warn!(status = %status, message = %message, "Resource not found");
                HttpResponse::build(status).json(AckEnvelope {
                    code: 404,
                    message: message.clone(),
                })
            }
            ApiError::Database(detail) => {
                error!(status = %status, detail = %detail, "Datastore failure");
                HttpResponse::build(status).json(OpaqueError {
                    message: "Internal Server Error".to_string(),
                })
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(domain) => ApiError::NotFound(domain.to_string()),
            None => ApiError::Database(err.to_string()),
        }
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[instrument(skip(state))]
pub async fn list_users<R: UserRepository>(
    state: web::Data<AppState<R>>,
) -> Result<HttpResponse, ApiError> {
    let users = state.service.list_users().await?;
    info!(count = users.len(), "Users listed");
    Ok(HttpResponse::Ok().json(ListEnvelope {
        code: 0,
        data: users,
        description: "Success".to_string(),
    }))
}

#[instrument(skip(state, body))]
pub async fn create_user<R: UserRepository>(
    state: web::Data<AppState<R>>,
    body: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    let new_user = validate_create(&body).map_err(ApiError::Validation)?;
    info!(name = %new_user.name, email = %new_user.email, "Creating user");
    let user = state.service.create_user(new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

#[instrument(skip(state, body))]
pub async fn update_user<R: UserRepository>(
    state: web::Data<AppState<R>>,
    body: web::Json<UpdateUser>,
) -> Result<HttpResponse, ApiError> {
    let (id, patch) = validate_update(&body).map_err(ApiError::Validation)?;
    state.service.update_user(id, patch).await?;
    Ok(HttpResponse::Ok().json(AckEnvelope {
        code: 0,
        message: "Update successful".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

#[instrument(skip(state))]
pub async fn delete_user<R: UserRepository>(
    state: web::Data<AppState<R>>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse, ApiError> {
    // The id check runs before any datastore access.
    let id = params
        .id
        .as_deref()
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| ApiError::BadRequest("id must be an integer".to_string()))?;
    state.service.delete_user(id).await?;
    Ok(HttpResponse::Ok().json(AckEnvelope {
        code: 0,
        message: "Delete successful".to_string(),
    }))
}
