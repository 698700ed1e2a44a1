use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{RegistrationDto, RegistrationReq};
use crate::api::rest::error::{map_domain_error, ApiError};
use crate::domain::service::Service;

/// List every registration, newest first
pub async fn list_registrations(
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<RegistrationDto>>, ApiError> {
    info!("Listing registrations");

    match svc.list().await {
        Ok(all) => Ok(Json(all.into_iter().map(RegistrationDto::from).collect())),
        Err(e) => {
            error!("Failed to list registrations: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific registration by id
pub async fn get_registration(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RegistrationDto>, ApiError> {
    info!("Getting registration with id: {}", id);

    match svc.get(&id).await {
        Ok(found) => Ok(Json(RegistrationDto::from(found))),
        Err(e) => {
            error!("Failed to get registration {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a new registration; responds 201 with a Location header
pub async fn create_registration(
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<RegistrationReq>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.inspect_err(|e| error!("Rejected create body: {}", e))?;
    info!("Creating registration");

    match svc.create(req.into()).await {
        Ok(created) => {
            let location = format!("{}/{}", uri.path().trim_end_matches('/'), created.id);
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(RegistrationDto::from(created)),
            ))
        }
        Err(e) => {
            error!("Failed to create registration: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Replace an existing registration; responds 204
pub async fn update_registration(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<RegistrationReq>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload.inspect_err(|e| error!("Rejected update body: {}", e))?;
    info!("Updating registration {}", id);

    match svc.update(&id, req.into()).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to update registration {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a registration by id; responds 204
pub async fn delete_registration(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<StatusCode, ApiError> {
    info!("Deleting registration: {}", id);

    match svc.delete(&id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete registration {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
