use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::RegistrationsConfig;
use crate::contract::client::RegistrationsApi;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::service::Service;
use crate::gateways::local::RegistrationsLocalClient;
use crate::infra::storage::store;

/// Registrations module: owns the store connection, the domain service and
/// the REST surface built on top of it.
#[derive(Clone)]
pub struct Registrations {
    api_prefix: String,
    service: Arc<Service>,
}

impl Registrations {
    /// Connect to the store and wire the service. Fails when the store is
    /// misconfigured or does not answer a ping.
    pub async fn init(cfg: RegistrationsConfig) -> anyhow::Result<Self> {
        Self::init_with_clock(cfg, Arc::new(SystemClock)).await
    }

    pub async fn init_with_clock(
        cfg: RegistrationsConfig,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        info!("Initializing registrations module");
        debug!(
            "Loaded registrations config: api_prefix={}, collection={}",
            cfg.api_prefix, cfg.store.collection_name
        );

        let repo = store::open(&cfg.store)
            .await
            .context("registration store unavailable")?;
        let service = Service::new(Arc::new(repo), clock);

        Ok(Self {
            api_prefix: normalize_prefix(&cfg.api_prefix),
            service: Arc::new(service),
        })
    }

    /// Prefix the resource routes are mounted under ("" when mounted at root).
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other crates
    pub fn client(&self) -> Arc<dyn RegistrationsApi> {
        Arc::new(RegistrationsLocalClient::new(self.service.clone()))
    }

    /// REST routes nested under the configured prefix.
    pub fn router(&self) -> Router {
        info!("Registering registrations REST routes");
        let api = routes::register_routes(Router::new(), self.service.clone());
        if self.api_prefix.is_empty() {
            api
        } else {
            Router::new().nest(&self.api_prefix, api)
        }
    }
}

/// "/api/" and "api" both become "/api"; "/" and "" mean the root.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_normalized() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix(" /v1/api/ "), "/v1/api");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }
}
