use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    client::RegistrationsApi,
    error::RegistrationsError,
    model::{NewRegistration, Registration},
};
use crate::domain::service::Service;

/// Local implementation of the RegistrationsApi trait that delegates to the domain service
pub struct RegistrationsLocalClient {
    service: Arc<Service>,
}

impl RegistrationsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RegistrationsApi for RegistrationsLocalClient {
    async fn list_registrations(&self) -> anyhow::Result<Vec<Registration>> {
        self.service
            .list()
            .await
            .map_err(|e| RegistrationsError::from(e).into())
    }

    async fn get_registration(&self, id: &str) -> anyhow::Result<Registration> {
        self.service
            .get(id)
            .await
            .map_err(|e| RegistrationsError::from(e).into())
    }

    async fn create_registration(
        &self,
        candidate: NewRegistration,
    ) -> anyhow::Result<Registration> {
        self.service
            .create(candidate)
            .await
            .map_err(|e| RegistrationsError::from(e).into())
    }

    async fn update_registration(
        &self,
        id: &str,
        candidate: NewRegistration,
    ) -> anyhow::Result<Registration> {
        self.service
            .update(id, candidate)
            .await
            .map_err(|e| RegistrationsError::from(e).into())
    }

    async fn delete_registration(&self, id: &str) -> anyhow::Result<()> {
        self.service
            .delete(id)
            .await
            .map_err(|e| RegistrationsError::from(e).into())
    }

    async fn check_store(&self) -> anyhow::Result<()> {
        self.service
            .health()
            .await
            .map_err(|e| RegistrationsError::from(e).into())
    }
}
