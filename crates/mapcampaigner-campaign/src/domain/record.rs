//! The persisted campaign record.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::geometry::Geometry;

/// A loosely-typed attribute mapping, as decoded from a document or supplied
/// by a form.
pub type Attributes = Map<String, Value>;

/// Attributes `update` may assign.
pub const MUTABLE_ATTRIBUTES: [&str; 10] = [
    "name",
    "campaign_status",
    "coverage",
    "geometry",
    "start_date",
    "end_date",
    "campaign_managers",
    "selected_functions",
    "tags",
    "description",
];

/// Attributes maintained by the store itself.
pub const READ_ONLY_ATTRIBUTES: [&str; 4] = ["uuid", "version", "campaign_creator", "edited_by"];

/// Attributes supplied as JSON text by forms and decoded before use.
pub const JSON_TEXT_ATTRIBUTES: [&str; 2] = ["geometry", "selected_functions"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Generates an identifier for a new campaign.
#[must_use]
pub fn new_campaign_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A campaign as stored in its backing document.
///
/// Field order is the key order of the written document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    /// Stable identifier; also names the backing file.
    pub uuid: String,
    /// Incremented by one on every save.
    pub version: u64,
    /// Display name; listings sort on it.
    pub name: String,
    /// Uploader who created the campaign.
    pub campaign_creator: String,
    /// Uploader of the last save.
    pub edited_by: String,
    /// Free-text status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub campaign_status: String,
    /// Region keys to opaque coverage payloads.
    #[serde(default, deserialize_with = "null_as_default")]
    pub coverage: Attributes,
    /// Single-feature polygon region in `[lon, lat]` order.
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub start_date: Option<CampaignDate>,
    #[serde(default, skip_serializing_if = "is_blank_date")]
    pub end_date: Option<CampaignDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub campaign_managers: Vec<String>,
    /// Analysis function id to plugin descriptor.
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_functions: BTreeMap<String, SelectedFunction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Descriptor of an analysis function selected for a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFunction {
    /// Name of the plugin that implements the function.
    pub function: String,
    /// Feature the function analyses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub feature: String,
    /// Attributes the function requires of that feature.
    #[serde(default)]
    pub attributes: Value,
    /// Keys this model does not interpret, kept as written.
    #[serde(flatten)]
    pub extra: Attributes,
}

/// A date attribute. Text that does not parse as `YYYY-MM-DD` is kept and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignDate {
    /// A calendar date.
    Date(NaiveDate),
    /// Unparseable text.
    Text(String),
}

impl CampaignDate {
    /// Parses `text` as `YYYY-MM-DD`, keeping it verbatim otherwise.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_or_else(|_| Self::Text(text.to_owned()), Self::Date)
    }

    /// The calendar date, if this holds one.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Text(_) => None,
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl From<NaiveDate> for CampaignDate {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl fmt::Display for CampaignDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for CampaignDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CampaignDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}

#[allow(clippy::ref_option)]
fn is_blank_date(date: &Option<CampaignDate>) -> bool {
    date.as_ref().is_none_or(CampaignDate::is_blank)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
