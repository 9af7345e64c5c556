//! Convergence of a pokemon's stored type associations towards a requested type list.
//!
//! Matching is positional: the association at index `i` is reused for the type requested at
//! index `i`. Surplus associations are pointed at [`DELETED_TYPE_ID`] rather than deleted, and
//! missing ones are created. Changes are applied one at a time, outside of any transaction, so
//! a storage error leaves the changes already applied in place.

use log::trace;

use crate::models::pokemon_type::{PokemonTypeAssociation, DELETED_TYPE_ID};
use crate::repositories::PokemonTypeRepository;

/// One storage write needed to converge a pokemon's associations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TypeChange {
    /// Repoint an existing association at another type.
    Update {
        /// Id of the association row to reuse
        association_id: i64,

        /// Type the association must now point at
        type_id: i64,
    },

    /// Create a new association.
    Create {
        /// Type of the new association
        type_id: i64,
    },
}

/// Computes the writes needed to go from `persisted` to `requested`.
///
/// - When at least as many types are requested as are persisted, associations whose type
///   already matches are left alone, the others are repointed, and one association is created
///   per extra requested type.
/// - When fewer types are requested, every persisted association is repointed: the first ones
///   at the requested types, the surplus at [`DELETED_TYPE_ID`].
pub fn plan_type_changes(requested: &[i64], persisted: &[PokemonTypeAssociation]) -> Vec<TypeChange> {
    if requested.len() >= persisted.len() {
        requested
            .iter()
            .enumerate()
            .filter_map(|(i, &type_id)| match persisted.get(i) {
                Some(association) if association.type_id == type_id => None,
                Some(association) => {
                    Some(TypeChange::Update { association_id: association.id, type_id })
                },
                None => Some(TypeChange::Create { type_id }),
            })
            .collect()
    } else {
        persisted
            .iter()
            .enumerate()
            .map(|(i, association)| TypeChange::Update {
                association_id: association.id,
                type_id: requested.get(i).copied().unwrap_or(DELETED_TYPE_ID),
            })
            .collect()
    }
}

/// Applies `changes` in order, stopping at the first storage error.
pub async fn apply_type_changes(
    pokemon_types: &dyn PokemonTypeRepository,
    pokemon_id: i64,
    changes: &[TypeChange],
) -> crate::Result<()> {
    for change in changes {
        trace!("Applying {:?} to pokemon {}", change, pokemon_id);

        match *change {
            TypeChange::Update { association_id, type_id } => {
                pokemon_types
                    .update_association(association_id, pokemon_id, type_id)
                    .await?;
            },
            TypeChange::Create { type_id } => {
                pokemon_types.create_association(pokemon_id, type_id).await?;
            },
        }
    }

    Ok(())
}
