/*
 * Responsibility
 * - Business rules for animals: owner normalization, ownership-or-admin authorization
 * - Stable existence check before create (nothing is written if it fails)
 * - Role-scoped listing
 *
 * Every operation receives the caller as (username, is_admin). Role gating
 * (USER/ADMIN) happens before this layer, in the handlers.
 */
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::repos::error::RepoError;
use crate::repos::{AnimalChanges, AnimalFilter, AnimalRepo, AnimalRow, NewAnimal};
use crate::services::identity;
use crate::services::stable_registry::{StableCheckError, StableRegistry};

#[derive(Debug, Error)]
pub enum AnimalServiceError {
    #[error("animal {id} not found")]
    NotFound { id: i64 },
    #[error("access to animal {id} denied")]
    Forbidden { id: i64 },
    #[error("tag '{tag}' is already in use")]
    TagConflict { tag: String },
    #[error(transparent)]
    Stable(#[from] StableCheckError),
    #[error(transparent)]
    Repo(RepoError),
}

pub type ServiceResult<T> = Result<T, AnimalServiceError>;

/// Caller-supplied attributes shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalFields {
    pub tag: String,
    pub breed: String,
    pub weight: f64,
    pub age: i32,
    pub status: String,
    pub feed_level: Option<f64>,
}

/// Access rule shared by get, update and delete.
pub fn can_access(owner: &str, caller: &str, is_admin: bool) -> bool {
    is_admin || identity::same_identity(owner, caller)
}

#[derive(Clone)]
pub struct AnimalService {
    repo: Arc<dyn AnimalRepo>,
    stables: Arc<dyn StableRegistry>,
}

impl std::fmt::Debug for AnimalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimalService").finish_non_exhaustive()
    }
}

impl AnimalService {
    pub fn new(repo: Arc<dyn AnimalRepo>, stables: Arc<dyn StableRegistry>) -> Self {
        Self { repo, stables }
    }

    /// Checks that `stable_id` exists and is visible to the caller.
    ///
    /// `None` skips the check. A missing/blank `authorization` fails closed.
    pub async fn verify_stable_exists(
        &self,
        stable_id: Option<i64>,
        authorization: Option<&str>,
    ) -> ServiceResult<()> {
        let Some(stable_id) = stable_id else {
            return Ok(());
        };

        let authorization = authorization
            .filter(|h| !h.trim().is_empty())
            .ok_or(StableCheckError::MissingAuthorization { stable_id })?;

        self.stables
            .verify_stable(stable_id, authorization)
            .await
            .inspect_err(|e| warn!(stable_id, error = %e, "stable verification failed"))?;

        Ok(())
    }

    /// Creates an animal owned by `username` (normalized). The owner is never client supplied.
    pub async fn create(
        &self,
        username: &str,
        fields: AnimalFields,
        stable_id: Option<i64>,
        authorization: Option<&str>,
    ) -> ServiceResult<AnimalRow> {
        self.verify_stable_exists(stable_id, authorization).await?;

        let owner = identity::normalize(username);
        info!(owner = %owner, tag = %fields.tag, ?stable_id, "creating animal");

        let new = NewAnimal {
            tag: fields.tag,
            breed: fields.breed,
            weight: fields.weight,
            age: fields.age,
            status: fields.status,
            owner_username: owner,
            feed_level: fields.feed_level,
            stable_id,
        };

        self.repo
            .create(&new)
            .await
            .map_err(|e| repo_error(e, &new.tag))
    }

    pub async fn get(&self, id: i64, username: &str, is_admin: bool) -> ServiceResult<AnimalRow> {
        self.find_authorized(id, username, is_admin, "read").await
    }

    /// Admins see every animal; everyone else only their own.
    pub async fn list(&self, username: &str, is_admin: bool) -> ServiceResult<Vec<AnimalRow>> {
        self.list_scoped(username, is_admin, None).await
    }

    /// Same scoping as [`Self::list`], restricted to one stable.
    pub async fn list_by_stable(
        &self,
        stable_id: i64,
        username: &str,
        is_admin: bool,
    ) -> ServiceResult<Vec<AnimalRow>> {
        self.list_scoped(username, is_admin, Some(stable_id)).await
    }

    /// Overwrites every attribute except the owner and stable.
    ///
    /// `new_owner` is honored only for admins; for anyone else it is ignored.
    pub async fn update(
        &self,
        id: i64,
        username: &str,
        is_admin: bool,
        fields: AnimalFields,
        new_owner: Option<&str>,
    ) -> ServiceResult<AnimalRow> {
        let existing = self.find_authorized(id, username, is_admin, "update").await?;

        let owner_username = match new_owner.map(identity::normalize) {
            Some(owner) if is_admin && !owner.is_empty() => {
                if owner != existing.owner_username {
                    info!(id, from = %existing.owner_username, to = %owner, "admin reassigning animal owner");
                }
                owner
            }
            _ => existing.owner_username,
        };

        let changes = AnimalChanges {
            tag: fields.tag,
            breed: fields.breed,
            weight: fields.weight,
            age: fields.age,
            status: fields.status,
            owner_username,
            feed_level: fields.feed_level,
        };

        self.repo
            .update(id, &changes)
            .await
            .map_err(|e| repo_error(e, &changes.tag))?
            // Deleted between the read and the write.
            .ok_or(AnimalServiceError::NotFound { id })
    }

    pub async fn delete(&self, id: i64, username: &str, is_admin: bool) -> ServiceResult<()> {
        self.find_authorized(id, username, is_admin, "delete").await?;

        info!(id, "deleting animal");
        if self.repo.delete(id).await.map_err(AnimalServiceError::Repo)? {
            Ok(())
        } else {
            Err(AnimalServiceError::NotFound { id })
        }
    }

    // Not-found is decided before ownership, so the two stay distinguishable.
    async fn find_authorized(
        &self,
        id: i64,
        username: &str,
        is_admin: bool,
        action: &'static str,
    ) -> ServiceResult<AnimalRow> {
        let animal = self
            .repo
            .get(id)
            .await
            .map_err(AnimalServiceError::Repo)?
            .ok_or_else(|| {
                warn!(id, action, "animal not found");
                AnimalServiceError::NotFound { id }
            })?;

        let owner = identity::normalize(&animal.owner_username);
        let caller = identity::normalize(username);

        if can_access(&owner, &caller, is_admin) {
            info!(id, action, owner = %owner, user = %caller, is_admin, "access granted");
            Ok(animal)
        } else {
            warn!(id, action, owner = %owner, user = %caller, "access denied");
            Err(AnimalServiceError::Forbidden { id })
        }
    }

    async fn list_scoped(
        &self,
        username: &str,
        is_admin: bool,
        stable_id: Option<i64>,
    ) -> ServiceResult<Vec<AnimalRow>> {
        let filter = if is_admin {
            info!(?stable_id, "admin listing animals");
            AnimalFilter {
                owner_username: None,
                stable_id,
            }
        } else {
            let owner = identity::normalize(username);
            info!(user = %owner, ?stable_id, "listing caller's animals");
            AnimalFilter {
                owner_username: Some(owner),
                stable_id,
            }
        };

        self.repo
            .list(&filter)
            .await
            .map_err(AnimalServiceError::Repo)
    }
}

fn repo_error(e: RepoError, tag: &str) -> AnimalServiceError {
    match e {
        RepoError::Conflict => {
            warn!(tag, "tag already in use");
            AnimalServiceError::TagConflict {
                tag: tag.to_string(),
            }
        }
        other => {
            tracing::error!(error = ?other, "animal repository failure");
            AnimalServiceError::Repo(other)
        }
    }
}
