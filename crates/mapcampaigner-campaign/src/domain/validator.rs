//! Structural validation of campaign documents.

use mapcampaigner_core::error::DomainError;
use serde_json::Value;

use super::record::Attributes;

/// Attributes every record must carry before it is written, in check order.
pub const REQUIRED_ATTRIBUTES: [&str; 5] =
    ["uuid", "version", "campaign_creator", "edited_by", "name"];

/// Validates a decoded document against the identifier it is stored under.
///
/// Runs before every write and after every load.
///
/// # Errors
///
/// Returns `DomainError::MissingRequiredAttribute` for the first required
/// attribute that is absent, or `DomainError::UuidMismatch` if the body's
/// `uuid` is not `expected_id`.
pub fn validate(attributes: &Attributes, expected_id: &str) -> Result<(), DomainError> {
    if let Some(missing) = REQUIRED_ATTRIBUTES
        .into_iter()
        .find(|name| !attributes.contains_key(*name))
    {
        return Err(DomainError::MissingRequiredAttribute(missing));
    }

    match attributes.get("uuid") {
        Some(Value::String(found)) if found == expected_id => Ok(()),
        Some(Value::String(found)) => Err(mismatch(expected_id, found.clone())),
        found => Err(mismatch(
            expected_id,
            found.map(Value::to_string).unwrap_or_default(),
        )),
    }
}

fn mismatch(expected: &str, found: String) -> DomainError {
    DomainError::UuidMismatch {
        expected: expected.to_owned(),
        found,
    }
}
