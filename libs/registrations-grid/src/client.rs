use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::model::{RegistrationForm, RegistrationRow};

/// What the grid needs from the registrations API.
#[async_trait]
pub trait RegistrationsBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<RegistrationRow>, BackendError>;

    async fn create(&self, form: &RegistrationForm) -> Result<RegistrationRow, BackendError>;

    async fn update(&self, id: &str, form: &RegistrationForm) -> Result<(), BackendError>;

    async fn delete(&self, id: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// 400 with field errors keyed by wire field name.
    #[error("{message}")]
    Rejected {
        message: String,
        errors: BTreeMap<String, String>,
    },

    #[error("registration not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    /// Network, decoding or unexpected status. Never field-attributed.
    #[error("transport error: {0}")]
    Transport(String),
}

impl BackendError {
    pub fn transport(e: impl std::fmt::Display) -> Self {
        Self::Transport(e.to_string())
    }

    /// Field errors of a rejected candidate.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Rejected { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Option<BTreeMap<String, String>>,
}

/// reqwest adapter for the REST API. `base` is the API root including the
/// prefix, e.g. `http://localhost:8087/api`.
#[derive(Clone)]
pub struct HttpRegistrationsClient {
    client: reqwest::Client,
    base: Url,
}

impl HttpRegistrationsClient {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    pub fn from_base_url(base: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            anyhow::bail!("'{base}' cannot be used as an API base URL");
        }
        Ok(Self::new(reqwest::Client::new(), base))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::transport("invalid API base URL"))?
            .pop_if_empty()
            .push("registrations")
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        form: Option<&RegistrationForm>,
    ) -> Result<Response, BackendError> {
        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(form) = form {
            req = req.json(form);
        }
        let resp = req.send().await.map_err(BackendError::transport)?;
        debug!(%method, %url, status = resp.status().as_u16(), "registrations API responded");

        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(error_from(resp).await)
        }
    }
}

async fn error_from(resp: Response) -> BackendError {
    let status = resp.status();
    let body: Option<ErrorBody> = resp.json().await.ok();
    let message = body
        .as_ref()
        .map(|b| b.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"));

    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound,
        StatusCode::CONFLICT => BackendError::Conflict(message),
        StatusCode::BAD_REQUEST => match body.and_then(|b| b.errors) {
            Some(errors) => BackendError::Rejected { message, errors },
            None => BackendError::Transport(message),
        },
        _ => BackendError::Transport(message),
    }
}

#[async_trait]
impl RegistrationsBackend for HttpRegistrationsClient {
    #[instrument(name = "registrations_grid.http.list", skip_all, fields(base = %self.base))]
    async fn list(&self) -> Result<Vec<RegistrationRow>, BackendError> {
        let url = self.url(&[])?;
        self.send(Method::GET, url, None)
            .await?
            .json()
            .await
            .map_err(BackendError::transport)
    }

    #[instrument(name = "registrations_grid.http.create", skip_all, fields(base = %self.base))]
    async fn create(&self, form: &RegistrationForm) -> Result<RegistrationRow, BackendError> {
        let url = self.url(&[])?;
        self.send(Method::POST, url, Some(form))
            .await?
            .json()
            .await
            .map_err(BackendError::transport)
    }

    #[instrument(name = "registrations_grid.http.update", skip_all, fields(id = %id))]
    async fn update(&self, id: &str, form: &RegistrationForm) -> Result<(), BackendError> {
        let url = self.url(&[id])?;
        self.send(Method::PUT, url, Some(form)).await?;
        Ok(())
    }

    #[instrument(name = "registrations_grid.http.delete", skip_all, fields(id = %id))]
    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let url = self.url(&[id])?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }
}
