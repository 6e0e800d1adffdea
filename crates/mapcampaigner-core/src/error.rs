//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No backing document exists for the identifier.
    #[error("campaign doesn't exist: {0}")]
    DoesNotExist(String),

    /// A backing document already exists for the identifier.
    #[error("campaign already exists: {0}")]
    AlreadyExists(String),

    /// The backing document is not a well-formed campaign record.
    #[error("corrupted campaign file {id}: {reason}")]
    CorruptedFile {
        /// The campaign whose file is corrupted.
        id: String,
        /// What the decoder rejected.
        reason: String,
    },

    /// One of the attributes every record must carry is absent.
    #[error("required attribute missing: {0}")]
    MissingRequiredAttribute(&'static str),

    /// The record body names a different campaign than its backing file.
    #[error("uuid is not the same in json: expected {expected}, found {found}")]
    UuidMismatch {
        /// The identifier used to locate the record.
        expected: String,
        /// The `uuid` value found in the record body.
        found: String,
    },

    /// An attribute name the campaign does not know.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// An attribute that is maintained by the store and cannot be assigned.
    #[error("attribute is read-only: {0}")]
    ReadOnlyAttribute(String),

    /// An attribute supplied as JSON text that does not parse.
    #[error("invalid attribute {name}: {reason}")]
    InvalidAttribute {
        /// The offending attribute.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The polygon region does not have the expected shape.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A coordinate string is not a `lat,lon` pair.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// An identifier that cannot be used as a document key.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The analysis function id is not selected for the campaign.
    #[error("insights function not assigned to this campaign: {0}")]
    FunctionNotAssigned(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
