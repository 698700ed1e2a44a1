//! Async side of the grid: owns the raw collection and the interaction
//! state, and talks to the backend for refresh, create, update and delete.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::client::{BackendError, RegistrationsBackend};
use crate::model::{RegistrationForm, RegistrationRow};
use crate::pipeline::{self, GridAction, GridState, GridView};
use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was sent.
    Declined,
    /// No row with that id is held locally.
    Unknown,
}

pub struct GridController {
    backend: Arc<dyn RegistrationsBackend>,
    rows: Vec<RegistrationRow>,
    state: GridState,
    loading: bool,
    last_error: Option<String>,
}

impl GridController {
    pub fn new(backend: Arc<dyn RegistrationsBackend>) -> Self {
        Self {
            backend,
            rows: Vec::new(),
            state: GridState::default(),
            loading: false,
            last_error: None,
        }
    }

    pub fn rows(&self) -> &[RegistrationRow] {
        &self.rows
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed backend call, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn view(&self) -> GridView<'_> {
        pipeline::render(&self.rows, &self.state)
    }

    /// Report over everything the current filter and sort produce.
    pub fn report(&self) -> Report {
        Report::open(pipeline::arrange(&self.rows, &self.state))
    }

    pub fn dispatch(&mut self, action: GridAction) {
        debug!(?action, "grid action");
        self.state = pipeline::reduce(&self.state, action, &self.rows);
    }

    /// Mark a fetch as in flight.
    pub fn begin_refresh(&mut self) {
        self.loading = true;
        self.last_error = None;
    }

    /// Apply a fetch result. Responses are applied in arrival order; a late
    /// response from an older fetch overwrites newer rows.
    pub fn finish_refresh(
        &mut self,
        result: Result<Vec<RegistrationRow>, BackendError>,
    ) -> Result<(), BackendError> {
        self.loading = false;
        match result {
            Ok(rows) => {
                debug!(count = rows.len(), "grid refreshed");
                self.rows = rows;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "grid refresh failed, keeping previous rows");
                self.last_error = Some(format!("Failed to fetch submissions: {e}"));
                Err(e)
            }
        }
    }

    /// Re-fetch the collection. Filter, sort and page survive.
    #[instrument(name = "registrations_grid.refresh", skip(self))]
    pub async fn refresh(&mut self) -> Result<(), BackendError> {
        self.begin_refresh();
        let result = self.backend.list().await;
        self.finish_refresh(result)
    }

    /// Copy of the row to hand to an editor. Grid state is untouched.
    pub fn edit(&self, id: &str) -> Option<RegistrationRow> {
        self.rows.iter().find(|r| r.id == id).cloned()
    }

    /// Create a registration and refresh on success. A rejection carries the
    /// server's field errors and leaves the grid as it was.
    #[instrument(name = "registrations_grid.submit", skip_all)]
    pub async fn submit(
        &mut self,
        form: &RegistrationForm,
    ) -> Result<RegistrationRow, BackendError> {
        self.loading = true;
        let created = self.backend.create(form).await;
        self.loading = false;

        let created = created.inspect_err(|e| self.record_failure("save", e))?;
        info!(id = %created.id, "registration submitted");
        // a failed reload is already recorded in last_error
        let _ = self.refresh().await;
        Ok(created)
    }

    /// Save an edited registration and refresh on success.
    #[instrument(name = "registrations_grid.save_edit", skip(self, form))]
    pub async fn save_edit(
        &mut self,
        id: &str,
        form: &RegistrationForm,
    ) -> Result<(), BackendError> {
        self.loading = true;
        let saved = self.backend.update(id, form).await;
        self.loading = false;

        saved.inspect_err(|e| self.record_failure("update", e))?;
        let _ = self.refresh().await;
        Ok(())
    }

    /// Delete after confirmation. On success the row is dropped locally
    /// without a re-fetch; on failure the collection is unchanged.
    #[instrument(name = "registrations_grid.delete", skip(self, confirm))]
    pub async fn delete<F>(
        &mut self,
        id: &str,
        confirm: F,
    ) -> Result<DeleteOutcome, BackendError>
    where
        F: FnOnce(&RegistrationRow) -> bool,
    {
        let Some(row) = self.rows.iter().find(|r| r.id == id) else {
            return Ok(DeleteOutcome::Unknown);
        };
        if !confirm(row) {
            debug!("delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let deleted = self.backend.delete(id).await;
        deleted.inspect_err(|e| self.record_failure("delete", e))?;

        self.rows.retain(|r| r.id != id);
        self.last_error = None;
        info!("registration deleted");
        Ok(DeleteOutcome::Deleted)
    }

    fn record_failure(&mut self, what: &str, e: &BackendError) {
        warn!(error = %e, "{what} failed");
        // field errors belong to the form, not the grid banner
        if e.field_errors().is_none() {
            self.last_error = Some(format!("Failed to {what} registration: {e}"));
        }
    }
}
