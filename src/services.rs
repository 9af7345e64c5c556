//! Business logic of the Pokedex, on top of the [storage accessors](crate::repositories).

pub mod pokemon;
pub mod types;
pub mod user;
