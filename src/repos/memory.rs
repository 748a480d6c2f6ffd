//! In-memory `AnimalRepo` used by service and router tests.
use std::sync::Mutex;

use async_trait::async_trait;

use crate::repos::animal_repo::{AnimalChanges, AnimalFilter, AnimalRepo, AnimalRow, NewAnimal};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Default)]
pub struct InMemoryAnimalRepo {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: Vec<AnimalRow>,
}

impl InMemoryAnimalRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    pub fn snapshot(&self, id: i64) -> Option<AnimalRow> {
        self.inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl AnimalRepo for InMemoryAnimalRepo {
    async fn create(&self, new: &NewAnimal) -> RepoResult<AnimalRow> {
        let mut inner = self.inner.lock().unwrap();
        if inner.rows.iter().any(|r| r.tag == new.tag) {
            return Err(RepoError::Conflict);
        }

        inner.next_id += 1;
        let row = AnimalRow {
            id: inner.next_id,
            tag: new.tag.clone(),
            breed: new.breed.clone(),
            weight: new.weight,
            age: new.age,
            status: new.status.clone(),
            owner_username: new.owner_username.clone(),
            feed_level: new.feed_level,
            stable_id: new.stable_id,
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<AnimalRow>> {
        Ok(self.snapshot(id))
    }

    async fn list(&self, filter: &AnimalFilter) -> RepoResult<Vec<AnimalRow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: &AnimalChanges) -> RepoResult<Option<AnimalRow>> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .rows
            .iter()
            .any(|r| r.id != id && r.tag == changes.tag)
        {
            return Err(RepoError::Conflict);
        }

        let Some(row) = inner.rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.tag = changes.tag.clone();
        row.breed = changes.breed.clone();
        row.weight = changes.weight;
        row.age = changes.age;
        row.status = changes.status.clone();
        row.owner_username = changes.owner_username.clone();
        row.feed_level = changes.feed_level;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rows.len();
        inner.rows.retain(|r| r.id != id);
        Ok(inner.rows.len() < before)
    }
}
