//! Shared fixtures for unit and router tests.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};

use crate::config::AccessTokenKey;
use crate::repos::memory::InMemoryAnimalRepo;
use crate::services::auth::TokenVerifier;
use crate::services::AnimalService;
use crate::services::stable_registry::{StableCheckError, StableRegistry};
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-must-be-long";

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn mint_token_with(secret: &str, claims: Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn mint_token(sub: &str, roles: Value) -> String {
    mint_token_with(
        TEST_SECRET,
        json!({"sub": sub, "roles": roles, "exp": now_secs() + 600}),
    )
}

pub fn test_verifier() -> TokenVerifier {
    TokenVerifier::new(&AccessTokenKey::Secret(TEST_SECRET.into()), None, None, 0).unwrap()
}

/// Stable registry double: every id exists unless told otherwise.
#[derive(Debug, Default)]
pub struct FakeStableRegistry {
    responses: Mutex<HashMap<i64, Result<(), StableCheckError>>>,
    calls: Mutex<Vec<(i64, String)>>,
}

impl FakeStableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, stable_id: i64, outcome: Result<(), StableCheckError>) {
        self.responses.lock().unwrap().insert(stable_id, outcome);
    }

    pub fn calls(&self) -> Vec<(i64, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StableRegistry for FakeStableRegistry {
    async fn verify_stable(
        &self,
        stable_id: i64,
        authorization: &str,
    ) -> Result<(), StableCheckError> {
        self.calls
            .lock()
            .unwrap()
            .push((stable_id, authorization.to_string()));
        self.responses
            .lock()
            .unwrap()
            .get(&stable_id)
            .cloned()
            .unwrap_or(Ok(()))
    }
}

pub struct TestApp {
    pub state: AppState,
    pub repo: Arc<InMemoryAnimalRepo>,
    pub stables: Arc<FakeStableRegistry>,
}

pub fn test_app() -> TestApp {
    let repo = Arc::new(InMemoryAnimalRepo::new());
    let stables = Arc::new(FakeStableRegistry::new());
    let animals = AnimalService::new(repo.clone(), stables.clone());
    let state = AppState::new(Arc::new(test_verifier()), animals);

    TestApp {
        state,
        repo,
        stables,
    }
}
