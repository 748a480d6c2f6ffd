pub mod animal;
pub mod auth;
pub mod identity;
pub mod stable_registry;

pub use animal::{AnimalFields, AnimalService};
pub use stable_registry::HttpStableRegistry;
