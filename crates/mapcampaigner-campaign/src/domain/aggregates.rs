//! The campaign entity and its versioned save cycle.

use chrono::{DateTime, Utc};
use mapcampaigner_core::error::DomainError;
use mapcampaigner_core::repository::DocumentRepository;
use serde_json::Value;
use tracing::info;

use super::codec;
use super::geometry::{BoundingBox, Geometry, Position};
use super::record::{
    Attributes, CampaignRecord, JSON_TEXT_ATTRIBUTES, MUTABLE_ATTRIBUTES, READ_ONLY_ATTRIBUTES,
};
use super::validator;

/// A campaign loaded from (or just written to) its backing document.
///
/// Nothing is cached between calls: every `load` re-reads the document.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub(crate) record: CampaignRecord,
    /// The body as last read or written, including keys the record ignores.
    document: Attributes,
    /// Modification time of the backing document.
    edited_at: DateTime<Utc>,
}

/// Which attribute names an assignment may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assignment {
    Create,
    Update,
}

impl Campaign {
    /// Loads the campaign stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DoesNotExist` if there is no backing document,
    /// `DomainError::CorruptedFile` if it is not a campaign document, and the
    /// validator's errors if required attributes are missing or the body's
    /// `uuid` differs from `id`.
    pub fn load(id: &str, repo: &dyn DocumentRepository) -> Result<Self, DomainError> {
        let stored = repo.load_document(id)?;
        let document = codec::deserialize(id, &stored.contents)?;
        validator::validate(&document, id)?;
        let record = codec::decode_record(id, document.clone())?;

        Ok(Self {
            record,
            document,
            edited_at: stored.modified_at,
        })
    }

    /// Creates a new campaign from form attributes.
    ///
    /// The uploader becomes creator and editor, and the version starts at 1.
    /// `geometry` and `selected_functions` may be supplied as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownAttribute`/`ReadOnlyAttribute` for keys a
    /// new campaign cannot be given, the validator's errors, attribute
    /// decoding errors, `DomainError::InvalidGeometry` for a malformed
    /// region, and `DomainError::AlreadyExists` if the identifier is taken.
    pub fn create(
        initial: Attributes,
        uploader: &str,
        repo: &dyn DocumentRepository,
    ) -> Result<Self, DomainError> {
        check_assignable(&initial, Assignment::Create)?;

        let mut attributes = initial;
        attributes.insert("version".to_owned(), Value::from(1));
        attributes.insert("edited_by".to_owned(), Value::from(uploader));
        attributes.insert("campaign_creator".to_owned(), Value::from(uploader));

        let id = match attributes.get("uuid") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(DomainError::InvalidAttribute {
                    name: "uuid".to_owned(),
                    reason: format!("expected a string, found {other}"),
                });
            }
            None => return Err(DomainError::MissingRequiredAttribute("uuid")),
        };
        validator::validate(&attributes, &id)?;
        decode_json_text(&mut attributes)?;
        let record = typed_record(attributes)?;

        let document = codec::to_attributes(&record)?;
        let text = codec::serialize(&record)?;
        let edited_at = repo.create_document(&id, &text)?;
        info!(campaign_id = %id, uploader, "campaign created");

        Ok(Self {
            record,
            document,
            edited_at,
        })
    }

    /// Assigns `partial` onto the campaign and saves it.
    ///
    /// Only the mutable attributes may be assigned. `geometry` and
    /// `selected_functions` may be supplied as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownAttribute`/`ReadOnlyAttribute` for keys
    /// outside the mutable set, attribute decoding errors,
    /// `DomainError::InvalidGeometry` for a malformed region, and whatever
    /// [`Campaign::save`] returns. The campaign is unchanged on error.
    pub fn update(
        &mut self,
        partial: Attributes,
        uploader: &str,
        repo: &dyn DocumentRepository,
    ) -> Result<(), DomainError> {
        check_assignable(&partial, Assignment::Update)?;

        let mut partial = partial;
        decode_json_text(&mut partial)?;
        let mut attributes = codec::to_attributes(&self.record)?;
        attributes.extend(partial);
        let record = typed_record(attributes)?;

        self.persist(record, uploader, repo)
    }

    /// Writes the campaign back as the next version, edited by `uploader`.
    ///
    /// There is no check that the stored version is still the one this
    /// campaign was loaded at: concurrent saves are last-writer-wins.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the version cannot be incremented,
    /// the validator's errors, or the repository's write error. The campaign
    /// is unchanged on error.
    pub fn save(&mut self, uploader: &str, repo: &dyn DocumentRepository) -> Result<(), DomainError> {
        self.persist(self.record.clone(), uploader, repo)
    }

    fn persist(
        &mut self,
        mut record: CampaignRecord,
        uploader: &str,
        repo: &dyn DocumentRepository,
    ) -> Result<(), DomainError> {
        record.version = record.version.checked_add(1).ok_or_else(|| {
            DomainError::Validation(format!("version {} cannot be incremented", record.version))
        })?;
        record.edited_by = uploader.to_owned();

        let document = codec::to_attributes(&record)?;
        validator::validate(&document, &self.record.uuid)?;
        let text = codec::serialize(&record)?;
        let edited_at = repo.save_document(&self.record.uuid, &text)?;
        info!(
            campaign_id = %record.uuid,
            version = record.version,
            uploader,
            "campaign saved"
        );

        self.record = record;
        self.document = document;
        self.edited_at = edited_at;
        Ok(())
    }

    /// The typed record.
    #[must_use]
    pub fn record(&self) -> &CampaignRecord {
        &self.record
    }

    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.record.uuid
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.record.version
    }

    /// Modification time of the backing document.
    #[must_use]
    pub fn edited_at(&self) -> DateTime<Utc> {
        self.edited_at
    }

    /// The raw document body as last read or written.
    #[must_use]
    pub fn document(&self) -> &Attributes {
        &self.document
    }

    /// The record's attributes as they would be written.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn attributes(&self) -> Result<Attributes, DomainError> {
        codec::to_attributes(&self.record)
    }

    /// The region's outer ring in `[lat, lon]` order; empty when the
    /// campaign has no geometry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidGeometry` if the stored region is malformed.
    pub fn corrected_coordinates(&self) -> Result<Vec<Position>, DomainError> {
        self.record
            .geometry
            .as_ref()
            .map_or_else(|| Ok(Vec::new()), Geometry::corrected_ring)
    }

    /// Bounding box of the region in `[lat, lon]` order; `None` when the
    /// campaign has no geometry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidGeometry` if the stored region is malformed.
    pub fn bounding_box(&self) -> Result<Option<BoundingBox>, DomainError> {
        Ok(BoundingBox::from_positions(&self.corrected_coordinates()?))
    }
}

fn check_assignable(attributes: &Attributes, assignment: Assignment) -> Result<(), DomainError> {
    for key in attributes.keys() {
        let key = key.as_str();
        if MUTABLE_ATTRIBUTES.contains(&key) || (assignment == Assignment::Create && key == "uuid")
        {
            continue;
        }
        if READ_ONLY_ATTRIBUTES.contains(&key) {
            return Err(DomainError::ReadOnlyAttribute(key.to_owned()));
        }
        return Err(DomainError::UnknownAttribute(key.to_owned()));
    }
    Ok(())
}

/// Replaces text-encoded structured attributes with their decoded value.
/// Blank text decodes to `null`.
fn decode_json_text(attributes: &mut Attributes) -> Result<(), DomainError> {
    for name in JSON_TEXT_ATTRIBUTES {
        let Some(Value::String(text)) = attributes.get(name) else {
            continue;
        };
        let decoded = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).map_err(|e| DomainError::InvalidAttribute {
                name: name.to_owned(),
                reason: e.to_string(),
            })?
        };
        attributes.insert(name.to_owned(), decoded);
    }
    Ok(())
}

fn typed_record(attributes: Attributes) -> Result<CampaignRecord, DomainError> {
    let record: CampaignRecord = serde_json::from_value(Value::Object(attributes))
        .map_err(|e| DomainError::Validation(format!("invalid campaign attributes: {e}")))?;
    if let Some(geometry) = &record.geometry {
        geometry.check_shape()?;
    }
    Ok(record)
}
