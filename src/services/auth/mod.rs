pub mod access_jwt;
pub mod factory;
pub mod role;

pub use access_jwt::{AccessJwtError, TokenVerifier};
pub use factory::build_token_verifier;
pub use role::Role;
