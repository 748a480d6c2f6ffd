/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - token verifier for the auth middleware, AnimalService for the handlers
 * - Cheap to Clone (Arc inside)
 */
use std::sync::Arc;

use crate::services::{AnimalService, auth::TokenVerifier};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<TokenVerifier>,
    pub animals: AnimalService,
}

impl AppState {
    pub fn new(auth: Arc<TokenVerifier>, animals: AnimalService) -> Self {
        Self { auth, animals }
    }
}
