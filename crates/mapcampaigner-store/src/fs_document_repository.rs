//! Filesystem implementation of the `DocumentRepository` trait.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use mapcampaigner_core::error::DomainError;
use mapcampaigner_core::repository::{DocumentRepository, StoredDocument};

use crate::config::{StoreConfig, check_identifier};

const DOCUMENT_EXTENSION: &str = "json";

/// Directory-backed document repository: one `<id>.json` file per document.
///
/// Writes go to a temporary file in the same directory that is then renamed
/// over the target, so a reader never observes a partial document. There is
/// no locking between writers.
#[derive(Debug, Clone)]
pub struct FsDocumentRepository {
    dir: PathBuf,
}

impl FsDocumentRepository {
    /// Creates a repository over `dir`. The directory is not created.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Opens the campaign directory named by `config`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the directory cannot be created.
    pub fn open(config: &StoreConfig) -> Result<Self, DomainError> {
        let dir = config.campaign_dir();
        fs::create_dir_all(&dir).map_err(|e| io_error("create campaign directory", &e))?;
        Ok(Self::new(dir))
    }

    /// The directory the documents live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, id: &str) -> Result<PathBuf, DomainError> {
        check_identifier(id)?;
        Ok(self.dir.join(format!("{id}.{DOCUMENT_EXTENSION}")))
    }

    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.tmp", Uuid::new_v4().simple()))
    }

    fn write_replacing(&self, path: &Path, contents: &str) -> Result<DateTime<Utc>, DomainError> {
        let temp_path = self.temp_path();
        write_or_discard(&temp_path, contents).map_err(|e| io_error("write temp file", &e))?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(io_error("rename temp file", &e));
        }

        modified_at(path).map_err(|e| io_error("read file metadata", &e))
    }

    /// Links a fully written temp file to `path`. Linking fails if `path`
    /// exists, so of two concurrent creates only one succeeds.
    fn write_new(
        &self,
        id: &str,
        path: &Path,
        contents: &str,
    ) -> Result<DateTime<Utc>, DomainError> {
        let temp_path = self.temp_path();
        write_or_discard(&temp_path, contents).map_err(|e| io_error("write temp file", &e))?;
        let linked = fs::hard_link(&temp_path, path);
        let _ = fs::remove_file(&temp_path);
        match linked {
            Ok(()) => modified_at(path).map_err(|e| io_error("read file metadata", &e)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(DomainError::AlreadyExists(id.to_owned()))
            }
            Err(e) => Err(io_error("link campaign file", &e)),
        }
    }
}

impl DocumentRepository for FsDocumentRepository {
    fn load_document(&self, id: &str) -> Result<StoredDocument, DomainError> {
        let path = self.document_path(id)?;
        let not_found = |e: io::Error| match e.kind() {
            io::ErrorKind::NotFound => DomainError::DoesNotExist(id.to_owned()),
            // Not UTF-8, so not JSON text.
            io::ErrorKind::InvalidData => DomainError::CorruptedFile {
                id: id.to_owned(),
                reason: e.to_string(),
            },
            _ => io_error("read campaign file", &e),
        };

        let contents = fs::read_to_string(&path).map_err(not_found)?;
        let modified_at = modified_at(&path).map_err(not_found)?;
        debug!(id, path = %path.display(), "loaded document");

        Ok(StoredDocument {
            id: id.to_owned(),
            contents,
            modified_at,
        })
    }

    fn save_document(&self, id: &str, contents: &str) -> Result<DateTime<Utc>, DomainError> {
        let path = self.document_path(id)?;
        let modified_at = self.write_replacing(&path, contents)?;
        debug!(id, path = %path.display(), "saved document");
        Ok(modified_at)
    }

    fn create_document(&self, id: &str, contents: &str) -> Result<DateTime<Utc>, DomainError> {
        let path = self.document_path(id)?;
        let modified_at = self.write_new(id, &path, contents)?;
        debug!(id, path = %path.display(), "created document");
        Ok(modified_at)
    }

    fn list_ids(&self) -> Result<Vec<String>, DomainError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list campaign directory", &e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error("list campaign directory", &e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            // A directory named `x.json` is not a document.
            if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) if check_identifier(stem).is_ok() => ids.push(stem.to_owned()),
                _ => warn!(path = %path.display(), "skipping unusable document name"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Writes `contents` to `path`, removing whatever was written if the write
/// fails partway.
fn write_or_discard(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents).inspect_err(|_| {
        let _ = fs::remove_file(path);
    })
}

fn modified_at(path: &Path) -> io::Result<DateTime<Utc>> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified))
}

fn io_error(context: &str, err: &io::Error) -> DomainError {
    DomainError::Infrastructure(format!("{context}: {err}"))
}
