use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewRegistration, Registration, UnsavedRegistration};
use crate::domain::error::DomainError;
use crate::domain::ports::Clock;
use crate::domain::repo::RegistrationsRepository;
use crate::domain::validation;

/// Domain service with the registration lifecycle rules.
/// Depends only on the repository and clock ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn RegistrationsRepository>,
    clock: Arc<dyn Clock>,
}

impl Service {
    pub fn new(repo: Arc<dyn RegistrationsRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Current instant at microsecond precision, the finest every store keeps.
    /// Stamps handed back by create/update must equal what a later get reads.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    #[instrument(name = "registrations.service.create", skip(self, candidate))]
    pub async fn create(&self, candidate: NewRegistration) -> Result<Registration, DomainError> {
        info!("Creating new registration");

        let now = self.now();
        let fields = validation::validate(&candidate, now.date_naive()).map_err(|errors| {
            debug!(%errors, "Registration candidate rejected");
            DomainError::validation(errors)
        })?;

        let created = self
            .repo
            .insert(UnsavedRegistration::stamped(fields, now))
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        info!(id = %created.id, "Successfully created registration");
        Ok(created)
    }

    #[instrument(name = "registrations.service.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<Registration>, DomainError> {
        debug!("Listing registrations");

        let all = self
            .repo
            .find_all()
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        debug!("Successfully listed {} registrations", all.len());
        Ok(all)
    }

    #[instrument(name = "registrations.service.get", skip(self), fields(registration_id = %id))]
    pub async fn get(&self, id: &str) -> Result<Registration, DomainError> {
        debug!("Getting registration by id");

        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
            .ok_or_else(|| DomainError::not_found(id))
    }

    /// Replace every mutable field of an existing registration.
    ///
    /// Lookup happens before validation, so an unknown id reports not-found
    /// even for an invalid candidate.
    #[instrument(
        name = "registrations.service.update",
        skip(self, candidate),
        fields(registration_id = %id)
    )]
    pub async fn update(
        &self,
        id: &str,
        candidate: NewRegistration,
    ) -> Result<Registration, DomainError> {
        info!("Updating registration");

        let mut current = self.get(id).await?;

        let now = self.now();
        let fields = validation::validate(&candidate, now.date_naive()).map_err(|errors| {
            debug!(%errors, "Registration candidate rejected");
            DomainError::validation(errors)
        })?;

        // updatedAt never moves backwards, even if the clock does
        let updated_at = now.max(current.updated_at);
        current.overwrite(fields, updated_at);

        let replaced = self
            .repo
            .replace(id, &current)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        if !replaced {
            warn!("Registration removed concurrently, update not applied");
            return Err(DomainError::vanished(id));
        }

        info!("Successfully updated registration");
        Ok(current)
    }

    #[instrument(name = "registrations.service.delete", skip(self), fields(registration_id = %id))]
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        info!("Deleting registration");

        self.get(id).await?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        // Lost a race with another delete: the outcome is the same.
        if !deleted {
            return Err(DomainError::not_found(id));
        }

        info!("Successfully deleted registration");
        Ok(())
    }

    /// Store reachability, used by the health endpoint.
    #[instrument(name = "registrations.service.health", skip(self))]
    pub async fn health(&self) -> Result<(), DomainError> {
        self.repo
            .ping()
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))
    }
}
