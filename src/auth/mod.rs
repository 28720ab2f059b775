//! Authentication and authorization for Taskgate
//!
//! Provides:
//! - Password hashing with bcrypt
//! - Token issuance and validation
//! - Identity resolution from bearer tokens

pub mod identity;
pub mod password;
pub mod token;

pub use identity::{extract_bearer, resolve};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};
