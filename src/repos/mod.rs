pub mod animal_repo;
pub mod error;

#[cfg(test)]
pub mod memory;

pub use animal_repo::{AnimalChanges, AnimalFilter, AnimalRepo, AnimalRow, NewAnimal, PgAnimalRepo};
