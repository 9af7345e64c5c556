//! Helpers to validate Pokemon request data.

use std::borrow::Cow;

use validator::ValidationError;

/// Validates the list of type ids attached to a Pokemon request.
///
/// Each id must reference a real type, so it must be strictly positive; `0` is reserved for
/// associations whose type has been removed. Duplicates and ordering are kept as-is.
pub fn validate_type_ids(type_ids: &[i64]) -> Result<(), ValidationError> {
    match type_ids.iter().find(|&&type_id| type_id < 1) {
        None => Ok(()),
        Some(invalid_id) => {
            let mut validation_error = ValidationError::new("invalid_type_id");
            validation_error.message =
                Some(Cow::from(format!("type ids must be positive, found {}", invalid_id)));
            validation_error.add_param(Cow::from("value"), invalid_id);

            Err(validation_error)
        },
    }
}
