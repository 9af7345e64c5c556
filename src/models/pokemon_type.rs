//! Models for the `pokemon_types` association table.

use diesel_derives::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};

use crate::schema::pokemon_types;

/// Type id stored in an association whose type has been removed from the Pokemon.
///
/// Reconciliation points surplus associations at this value instead of deleting their rows.
pub const DELETED_TYPE_ID: i64 = 0;

/// One link between a Pokemon and a type, with the type's name joined in.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct PokemonTypeAssociation {
    /// Id of the association row
    pub id: i64,

    /// Id of the owning Pokemon
    pub pokemon_id: i64,

    /// Id of the associated type
    pub type_id: i64,

    /// Name of the associated type, read from the `types` table
    pub name: String,
}

impl PokemonTypeAssociation {
    /// Returns `true` unless this association has been pointed at [`DELETED_TYPE_ID`].
    pub fn is_live(&self) -> bool {
        self.type_id > DELETED_TYPE_ID
    }
}

/// Model used to insert or repoint a row of the `pokemon_types` table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = pokemon_types)]
#[allow(missing_docs)]
pub struct NewPokemonTypeAssociation {
    pub pokemon_id: i64,
    pub type_id: i64,
}
