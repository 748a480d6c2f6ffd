/// Factory: build `TokenVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AccessJwtError, TokenVerifier};

pub fn build_token_verifier(config: &Config) -> Result<Arc<TokenVerifier>, AccessJwtError> {
    let verifier = TokenVerifier::new(
        &config.access_token_key,
        config.auth_issuer.as_deref(),
        config.auth_audience.as_deref(),
        config.access_token_leeway_seconds,
    )
    .inspect_err(|e| tracing::error!(error = %e, "failed to build access token verifier"))?;

    Ok(Arc::new(verifier))
}
