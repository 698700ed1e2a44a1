use async_trait::async_trait;

use crate::contract::model::{Registration, UnsavedRegistration};

/// Port for the domain layer: persistence operations over the registration
/// collection. Ids are opaque strings produced by the implementation.
#[async_trait]
pub trait RegistrationsRepository: Send + Sync {
    /// Every document, newest `created_at` first.
    async fn find_all(&self) -> anyhow::Result<Vec<Registration>>;

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Registration>>;

    /// Persist a new document; the repository assigns the id.
    async fn insert(&self, doc: UnsavedRegistration) -> anyhow::Result<Registration>;

    /// Full replacement keyed by `id`. Never creates. Returns false when
    /// nothing matched.
    async fn replace(&self, id: &str, doc: &Registration) -> anyhow::Result<bool>;

    /// Returns false when nothing matched.
    async fn delete(&self, id: &str) -> anyhow::Result<bool>;

    /// Liveness probe against the store.
    async fn ping(&self) -> anyhow::Result<()>;
}
