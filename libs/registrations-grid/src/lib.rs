//! Client side of the registrations API: the grid's filter → sort → paginate
//! pipeline, the paginated report, and an async controller that drives
//! refresh/edit/delete against a [`client::RegistrationsBackend`].

pub mod client;
pub mod controller;
pub mod model;
pub mod paginate;
pub mod pipeline;
pub mod report;

pub use client::{BackendError, HttpRegistrationsClient, RegistrationsBackend};
pub use controller::{DeleteOutcome, GridController};
pub use model::{RegistrationForm, RegistrationRow, CITIES};
pub use pipeline::{GridAction, GridState, GridView, SearchField, SortDirection, SortKey};
pub use report::Report;
