/*
 * Responsibility
 * - Animals request/response DTOs (camelCase on the wire)
 * - validate() does shape checks only; ownership is the service's concern
 */
use serde::{Deserialize, Serialize};

use crate::repos::AnimalRow;
use crate::services::AnimalFields;

fn validate_fields(
    tag: &str,
    breed: &str,
    weight: f64,
    age: i32,
    status: &str,
    feed_level: Option<f64>,
) -> Result<(), &'static str> {
    if tag.trim().is_empty() {
        return Err("tag is required");
    }
    if breed.trim().is_empty() {
        return Err("breed is required");
    }
    if !(weight.is_finite() && weight > 0.0) {
        return Err("weight must be positive");
    }
    if age <= 0 {
        return Err("age must be positive");
    }
    if status.trim().is_empty() {
        return Err("status is required");
    }
    match feed_level {
        None => return Err("feedLevel is required"),
        Some(level) if !(level.is_finite() && level > 0.0) => {
            return Err("feedLevel must be positive");
        }
        Some(_) => {}
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimalRequest {
    pub tag: String,
    pub breed: String,
    pub weight: f64,
    pub age: i32,
    pub status: String,
    pub feed_level: Option<f64>,
    pub stable_id: Option<i64>,
}

impl CreateAnimalRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_fields(
            &self.tag,
            &self.breed,
            self.weight,
            self.age,
            &self.status,
            self.feed_level,
        )?;
        if self.stable_id.is_none() {
            return Err("stableId is required");
        }

        Ok(())
    }

    pub fn fields(&self) -> AnimalFields {
        AnimalFields {
            tag: self.tag.trim().to_string(),
            breed: self.breed.trim().to_string(),
            weight: self.weight,
            age: self.age,
            status: self.status.trim().to_string(),
            feed_level: self.feed_level,
        }
    }
}

/// Same shape as create minus `stableId`. `ownerUsername` only has an effect for admins.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnimalRequest {
    pub tag: String,
    pub breed: String,
    pub weight: f64,
    pub age: i32,
    pub status: String,
    pub feed_level: Option<f64>,
    pub owner_username: Option<String>,
}

impl UpdateAnimalRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_fields(
            &self.tag,
            &self.breed,
            self.weight,
            self.age,
            &self.status,
            self.feed_level,
        )
    }

    pub fn fields(&self) -> AnimalFields {
        AnimalFields {
            tag: self.tag.trim().to_string(),
            breed: self.breed.trim().to_string(),
            weight: self.weight,
            age: self.age,
            status: self.status.trim().to_string(),
            feed_level: self.feed_level,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalResponse {
    pub id: i64,
    pub tag: String,
    pub breed: String,
    pub weight: f64,
    pub age: i32,
    pub status: String,
    pub owner_username: String,
    pub feed_level: Option<f64>,
    pub stable_id: Option<i64>,
}

impl From<AnimalRow> for AnimalResponse {
    fn from(row: AnimalRow) -> Self {
        Self {
            id: row.id,
            tag: row.tag,
            breed: row.breed,
            weight: row.weight,
            age: row.age,
            status: row.status,
            owner_username: row.owner_username,
            feed_level: row.feed_level,
            stable_id: row.stable_id,
        }
    }
}
