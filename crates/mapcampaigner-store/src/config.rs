//! Store configuration and on-disk layout.
//!
//! ```text
//! <data_root>/
//!     campaign/<uuid>.json
//!     coverage/<uuid>/
//! ```

use std::path::{Path, PathBuf};

use mapcampaigner_core::error::DomainError;

/// Environment variable naming the data root.
pub const DATA_DIR_ENV: &str = "CAMPAIGN_DATA_DIR";

/// Data root used when the environment does not name one.
pub const DEFAULT_DATA_DIR: &str = "campaigns_data";

const CAMPAIGN_DIR: &str = "campaign";
const COVERAGE_DIR: &str = "coverage";

/// Location of the campaign data on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    data_root: PathBuf,
}

impl StoreConfig {
    /// Creates a configuration rooted at `data_root`.
    #[must_use]
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// Reads the data root from `CAMPAIGN_DATA_DIR`, falling back to
    /// `campaigns_data` in the working directory.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through `lookup` instead of the process
    /// environment. A blank value counts as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_root = lookup(DATA_DIR_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_owned());
        Self::new(data_root)
    }

    /// The directory holding every campaign data folder.
    #[must_use]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// The directory holding one `<uuid>.json` per campaign.
    #[must_use]
    pub fn campaign_dir(&self) -> PathBuf {
        self.data_root.join(CAMPAIGN_DIR)
    }

    /// The coverage folder of one campaign.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidIdentifier` if `id` cannot be used as a
    /// path component.
    pub fn coverage_dir(&self, id: &str) -> Result<PathBuf, DomainError> {
        check_identifier(id)?;
        Ok(self.data_root.join(COVERAGE_DIR).join(id))
    }
}

/// Rejects identifiers that would escape the campaign directory or collide
/// with temporary files.
pub(crate) fn check_identifier(id: &str) -> Result<(), DomainError> {
    let usable = !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\', '\0']);
    if usable {
        Ok(())
    } else {
        Err(DomainError::InvalidIdentifier(id.to_owned()))
    }
}
