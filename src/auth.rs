//! Account roles, password hashing and session tokens.

pub mod password;
pub mod role;
pub mod session;

pub use role::Role;
