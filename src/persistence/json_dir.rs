use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::document::{PageDocument, SaveReport, SaveTicket};
use crate::error::{BuilderError, Result};

use super::PagePersistence;

/// Stores each page as one JSON file in a directory.
///
/// Writes go through a temporary file and a rename so a crashed save never
/// leaves a truncated document behind.
#[derive(Debug)]
pub struct JsonDirPersistence {
    root: PathBuf,
    reports: Vec<SaveReport>,
}

impl JsonDirPersistence {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            reports: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `page_id`, named by the blake3 digest of the id so no
    /// two ids share a file whatever characters they contain.
    pub fn path_for(&self, page_id: &str) -> PathBuf {
        let digest = blake3::hash(page_id.as_bytes());
        self.root.join(format!("{}.json", digest.to_hex()))
    }

    fn write(&self, page_id: &str, document: &PageDocument) -> Result<()> {
        let path = self.path_for(page_id);
        let staging = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(document)?;
        {
            let mut file = fs::File::create(&staging)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&staging, &path)?;
        Ok(())
    }
}

impl PagePersistence for JsonDirPersistence {
    fn submit(&mut self, page_id: &str, ticket: SaveTicket, document: PageDocument) -> Result<()> {
        let report = match self.write(page_id, &document) {
            Ok(()) => SaveReport::succeeded(ticket),
            Err(err) => SaveReport::failed(ticket, err.to_string()),
        };
        self.reports.push(report);
        Ok(())
    }

    fn load(&self, page_id: &str) -> Result<PageDocument> {
        let bytes = fs::read(self.path_for(page_id)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => BuilderError::PageNotFound(page_id.to_string()),
            _ => BuilderError::Io(err),
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn poll_reports(&mut self) -> Vec<SaveReport> {
        std::mem::take(&mut self.reports)
    }
}
