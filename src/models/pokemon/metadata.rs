//! Codec for the secondary Pokemon attributes stored in the `metadata` text column.
//!
//! The column holds a JSON object with a fixed shape:
//!
//! ```json
//! {"image_url":"","description":"","weight":0.0,"height":0.0,"stats":{"hp":0,"attack":0,"defense":0,"speed":0}}
//! ```
//!
//! Missing fields decode to their zero value. Anything that is not a JSON object of that shape
//! (including an empty string) is a [`Metadata`](crate::Error::Metadata) error.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::MetadataContext;

/// Secondary attributes of a Pokemon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct PokemonMetadata {
    /// URL of a picture of the Pokemon
    #[schema(example = "https://img.pokemondb.net/artwork/bulbasaur.jpg")]
    pub image_url: String,

    /// Free-form description
    pub description: String,

    /// Weight, in kilograms
    #[validate(range(min = 0.0))]
    #[schema(example = 6.9)]
    pub weight: f64,

    /// Height, in meters
    #[validate(range(min = 0.0))]
    #[schema(example = 0.7)]
    pub height: f64,

    /// Battle stats
    pub stats: Stats,
}

/// Battle stats of a Pokemon.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Stats {
    /// Hit points
    pub hp: i64,

    /// Attack stat
    pub attack: i64,

    /// Defense stat
    #[serde(alias = "def")]
    pub defense: i64,

    /// Speed stat
    pub speed: i64,
}

impl PokemonMetadata {
    /// Serializes the attributes to the text stored in the `metadata` column.
    pub fn encode(&self) -> crate::Result<String> {
        serde_json::to_string(self).with_metadata_context(|| "failed to encode pokemon metadata")
    }

    /// Parses the content of a `metadata` column.
    pub fn decode(text: &str) -> crate::Result<Self> {
        serde_json::from_str(text).with_metadata_context(|| "failed to decode pokemon metadata")
    }
}
