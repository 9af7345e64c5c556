//! Models used to create/update/load Pokemon types.

use diesel_derives::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::{ToResponse, ToSchema};
use validator::Validate;

use crate::schema::types;

/// A Pokemon type, like `Grass` or `Poison`.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize, ToSchema, ToResponse,
)]
#[diesel(table_name = types, check_for_backend(diesel::pg::Pg))]
#[response(
    description = "Type information",
    example = json!({
        "id": 4,
        "name": "Grass"
    }),
)]
pub struct Type {
    /// Unique id of the type
    pub id: i64,

    /// Type name
    #[schema(example = "Grass")]
    pub name: String,
}

/// Information to create or rename a type.
#[derive(
    Debug, Clone, PartialEq, Eq, Insertable, AsChangeset, Serialize, Deserialize, Validate, ToSchema,
)]
#[diesel(table_name = types)]
#[serde(deny_unknown_fields)]
pub struct TypeRequest {
    /// Type name
    #[validate(length(min = 1))]
    #[schema(example = "Grass")]
    pub name: String,
}

/// Model used to import types from the seed CSV file.
///
/// Used by the `seed_db` command.
#[derive(Debug, Clone, Insertable, Deserialize, Validate)]
#[diesel(table_name = types)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ImportType {
    pub id: i64,
    #[validate(length(min = 1))]
    pub name: String,
}
