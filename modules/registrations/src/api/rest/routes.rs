use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Register the registration resource routes on `router`.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route(
            "/registrations",
            get(handlers::list_registrations).post(handlers::create_registration),
        )
        .route(
            "/registrations/{id}",
            get(handlers::get_registration)
                .put(handlers::update_registration)
                .delete(handlers::delete_registration),
        )
        .layer(Extension(service))
}
