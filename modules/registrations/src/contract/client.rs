use async_trait::async_trait;

use crate::contract::model::{NewRegistration, Registration};

/// Public API trait for the registrations module that other crates can use
#[async_trait]
pub trait RegistrationsApi: Send + Sync {
    /// All registrations, newest first
    async fn list_registrations(&self) -> anyhow::Result<Vec<Registration>>;

    async fn get_registration(&self, id: &str) -> anyhow::Result<Registration>;

    async fn create_registration(&self, candidate: NewRegistration) -> anyhow::Result<Registration>;

    /// Replace all mutable fields of an existing registration
    async fn update_registration(
        &self,
        id: &str,
        candidate: NewRegistration,
    ) -> anyhow::Result<Registration>;

    async fn delete_registration(&self, id: &str) -> anyhow::Result<()>;

    /// Liveness of the backing store
    async fn check_store(&self) -> anyhow::Result<()>;
}
