//! User roles.

// strum's `FromRepr` generates an undocumented method
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, FromRepr};
use utoipa::ToSchema;

/// Role of a user account. Roles are ordered: `Public < User < Admin`.
///
/// Stored as an int in the `users` table (see [`Role::from_repr`]) and carried by name in
/// session tokens and JSON payloads.
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    FromRepr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(i32)]
pub enum Role {
    /// Anonymous access; can only read the public catalogue.
    Public = 0,

    /// Registered user; can also catch pokemons.
    #[default]
    User = 1,

    /// Administrator; can manage pokemons and types.
    Admin = 2,
}

impl Role {
    /// Returns `true` if this role grants at least the access of `required`.
    pub fn allows(self, required: Role) -> bool {
        self >= required
    }
}

/// Error returned when an int stored in the database does not map to a [`Role`].
#[derive(Debug, thiserror::Error)]
#[error("unknown role value {0}")]
pub struct UnknownRole(pub i32);

impl TryFrom<i32> for Role {
    type Error = UnknownRole;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Role::from_repr(value).ok_or(UnknownRole(value))
    }
}

impl From<Role> for i32 {
    fn from(value: Role) -> Self {
        value as i32
    }
}
