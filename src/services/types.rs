//! Service used to manage the pokemon types catalogue.

use std::sync::Arc;

use crate::models::types::{Type, TypeRequest};
use crate::repositories::{Repositories, TypeRepository};

/// Service implementation for type entities.
#[derive(Clone)]
pub struct Service {
    types: Arc<dyn TypeRepository>,
}

impl Service {
    /// Creates a new type service using the provided storage accessors.
    pub fn new(repositories: &Repositories) -> Self {
        Self { types: repositories.types.clone() }
    }

    /// Lists all types, ordered by id.
    pub async fn list_types(&self) -> crate::Result<Vec<Type>> {
        self.types.list_types().await
    }

    /// Returns the type with the given ID.
    pub async fn get_type(&self, type_id: i64) -> crate::Result<Type> {
        self.types.get_type(type_id).await
    }

    /// Creates a new type.
    pub async fn create_type(&self, new_type: &TypeRequest) -> crate::Result<Type> {
        self.types.create_type(new_type).await
    }

    /// Renames the type with the given ID.
    pub async fn update_type(&self, type_id: i64, updated_type: &TypeRequest) -> crate::Result<Type> {
        self.types.update_type(type_id, updated_type).await
    }

    /// Deletes the type with the given ID.
    ///
    /// Associations pointing at it are kept; they stop showing up in pokemon type lists.
    pub async fn delete_type(&self, type_id: i64) -> crate::Result<()> {
        self.types.delete_type(type_id).await
    }
}
