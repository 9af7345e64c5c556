//! Models for user accounts and the account endpoints.

use diesel_derives::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Role;
use crate::schema::users;

/// Row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
#[diesel(table_name = users, check_for_backend(diesel::pg::Pg))]
#[allow(missing_docs)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[diesel(deserialize_as = i32)]
    pub role: Role,
}

/// Model used to insert a row in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = users)]
#[allow(missing_docs)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[diesel(serialize_as = i32)]
    pub role: Role,
}

/// Information to register a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "username": "ash",
    "email": "ash@pallet.town",
    "password": "pikachu",
    "role": "user"
}))]
pub struct RegisterRequest {
    /// Unique user name
    pub username: String,

    /// Contact email
    #[serde(default)]
    pub email: String,

    /// Password, in clear text
    pub password: String,

    /// Role granted to the account
    #[serde(default)]
    pub role: Role,
}

/// Credentials sent to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User name
    pub username: String,

    /// Password, in clear text
    pub password: String,
}

/// Returned when an account has been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUser {
    /// Id of the new account
    pub id: i64,
}
