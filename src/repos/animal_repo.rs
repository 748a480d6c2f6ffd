/*
 * Responsibility
 * - animals CRUD (SQLx / Postgres)
 * - "tag" is UNIQUE; a violation surfaces as RepoError::Conflict
 * - owner values arrive already normalized; this layer compares them verbatim
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AnimalRow {
    #[sqlx(rename = "animalId")]
    pub id: i64,

    pub tag: String,
    pub breed: String,
    pub weight: f64,
    pub age: i32,
    pub status: String,

    #[sqlx(rename = "ownerUsername")]
    pub owner_username: String,

    #[sqlx(rename = "feedLevel")]
    pub feed_level: Option<f64>,

    #[sqlx(rename = "stableId")]
    pub stable_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAnimal {
    pub tag: String,
    pub breed: String,
    pub weight: f64,
    pub age: i32,
    pub status: String,
    pub owner_username: String,
    pub feed_level: Option<f64>,
    pub stable_id: Option<i64>,
}

/// Full replacement state for an existing row. `stableId` is never rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalChanges {
    pub tag: String,
    pub breed: String,
    pub weight: f64,
    pub age: i32,
    pub status: String,
    pub owner_username: String,
    pub feed_level: Option<f64>,
}

/// `None` means "don't filter on this column".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalFilter {
    pub owner_username: Option<String>,
    pub stable_id: Option<i64>,
}

// In-process filtering for the in-memory repo; Postgres filters in SQL.
#[cfg(test)]
impl AnimalFilter {
    pub fn matches(&self, row: &AnimalRow) -> bool {
        self.owner_username
            .as_deref()
            .is_none_or(|owner| row.owner_username == owner)
            && self.stable_id.is_none_or(|id| row.stable_id == Some(id))
    }
}

#[async_trait]
pub trait AnimalRepo: Send + Sync {
    async fn create(&self, new: &NewAnimal) -> RepoResult<AnimalRow>;

    async fn get(&self, id: i64) -> RepoResult<Option<AnimalRow>>;

    async fn list(&self, filter: &AnimalFilter) -> RepoResult<Vec<AnimalRow>>;

    /// Returns `None` when the row no longer exists.
    async fn update(&self, id: i64, changes: &AnimalChanges) -> RepoResult<Option<AnimalRow>>;

    /// Returns `true` when a row was removed.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgAnimalRepo {
    pool: PgPool,
}

impl PgAnimalRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnimalRepo for PgAnimalRepo {
    async fn create(&self, new: &NewAnimal) -> RepoResult<AnimalRow> {
        let row = sqlx::query_as::<_, AnimalRow>(
            r#"
            INSERT INTO animals
                (tag, breed, weight, age, status, "ownerUsername", "feedLevel", "stableId")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                "animalId", tag, breed, weight, age, status, "ownerUsername", "feedLevel", "stableId"
            "#,
        )
        .bind(&new.tag)
        .bind(&new.breed)
        .bind(new.weight)
        .bind(new.age)
        .bind(&new.status)
        .bind(&new.owner_username)
        .bind(new.feed_level)
        .bind(new.stable_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<AnimalRow>> {
        let row = sqlx::query_as::<_, AnimalRow>(
            r#"
            SELECT
                "animalId", tag, breed, weight, age, status, "ownerUsername", "feedLevel", "stableId"
            FROM animals
            WHERE "animalId" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, filter: &AnimalFilter) -> RepoResult<Vec<AnimalRow>> {
        let rows = sqlx::query_as::<_, AnimalRow>(
            r#"
            SELECT
                "animalId", tag, breed, weight, age, status, "ownerUsername", "feedLevel", "stableId"
            FROM animals
            WHERE ($1::TEXT IS NULL OR "ownerUsername" = $1)
              AND ($2::BIGINT IS NULL OR "stableId" = $2)
            ORDER BY "animalId" ASC
            "#,
        )
        .bind(filter.owner_username.as_deref())
        .bind(filter.stable_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update(&self, id: i64, changes: &AnimalChanges) -> RepoResult<Option<AnimalRow>> {
        // Single statement; concurrent writers race with last-write-wins.
        let row = sqlx::query_as::<_, AnimalRow>(
            r#"
            UPDATE animals
            SET
                tag = $2,
                breed = $3,
                weight = $4,
                age = $5,
                status = $6,
                "ownerUsername" = $7,
                "feedLevel" = $8
            WHERE "animalId" = $1
            RETURNING
                "animalId", tag, breed, weight, age, status, "ownerUsername", "feedLevel", "stableId"
            "#,
        )
        .bind(id)
        .bind(&changes.tag)
        .bind(&changes.breed)
        .bind(changes.weight)
        .bind(changes.age)
        .bind(&changes.status)
        .bind(&changes.owner_username)
        .bind(changes.feed_level)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM animals
            WHERE "animalId" = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(owner: &str, stable_id: Option<i64>) -> AnimalRow {
        AnimalRow {
            id: 1,
            tag: "T-1".into(),
            breed: "Holstein".into(),
            weight: 420.0,
            age: 3,
            status: "ACTIVE".into(),
            owner_username: owner.into(),
            feed_level: None,
            stable_id,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = AnimalFilter::default();
        assert!(filter.matches(&row("alice", None)));
        assert!(filter.matches(&row("bob", Some(3))));
    }

    #[test]
    fn filter_combines_owner_and_stable() {
        let filter = AnimalFilter {
            owner_username: Some("alice".into()),
            stable_id: Some(3),
        };

        assert!(filter.matches(&row("alice", Some(3))));
        assert!(!filter.matches(&row("alice", Some(4))));
        assert!(!filter.matches(&row("alice", None)));
        assert!(!filter.matches(&row("bob", Some(3))));
    }
}
