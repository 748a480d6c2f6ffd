//! Client for the stable registry, the service that owns stables.
//!
//! The animal service only ever asks one question of it: "does stable `id`
//! exist, and may the caller see it?". The answer comes from a single
//! `GET {base}/{id}` carrying the caller's own `Authorization` header.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StableCheckError {
    #[error("authorization header required to verify stable {stable_id}")]
    MissingAuthorization { stable_id: i64 },
    #[error("stable {stable_id} does not exist")]
    NotFound { stable_id: i64 },
    #[error("no permission to access stable {stable_id}")]
    Forbidden { stable_id: i64 },
    #[error("stable service rejected the caller's token")]
    Unauthorized,
    #[error("stable service unavailable: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait StableRegistry: Send + Sync {
    /// `Ok(())` when the stable exists and the caller may access it.
    ///
    /// `authorization` is forwarded verbatim. No retries.
    async fn verify_stable(&self, stable_id: i64, authorization: &str)
    -> Result<(), StableCheckError>;
}

#[derive(Debug, Clone)]
pub struct HttpStableRegistry {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpStableRegistry {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn stable_url(&self, stable_id: i64) -> Result<Url, url::ParseError> {
        self.base_url.join(&stable_id.to_string())
    }
}

// `Url::join` replaces the last path segment unless the base ends with '/'.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl StableRegistry for HttpStableRegistry {
    async fn verify_stable(
        &self,
        stable_id: i64,
        authorization: &str,
    ) -> Result<(), StableCheckError> {
        let url = self
            .stable_url(stable_id)
            .map_err(|e| StableCheckError::Upstream(e.to_string()))?;

        let response = self
            .client
            .get(url.clone())
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, %url, stable_id, "stable service request failed");
                StableCheckError::Upstream(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(%url, stable_id, %status, "stable service responded");

        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StableCheckError::NotFound { stable_id }),
            StatusCode::FORBIDDEN => Err(StableCheckError::Forbidden { stable_id }),
            StatusCode::UNAUTHORIZED => Err(StableCheckError::Unauthorized),
            other => {
                tracing::warn!(%url, stable_id, status = %other, "unexpected stable service status");
                Err(StableCheckError::Upstream(format!("unexpected status {other}")))
            }
        }
    }
}
