//! Models used to load and save Pokedex entities, and the API payloads built from them.

pub mod pokemon;
pub mod pokemon_type;
pub mod types;
pub mod user;
