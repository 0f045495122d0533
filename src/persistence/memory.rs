use std::collections::HashMap;

use crate::document::{PageDocument, SaveReport, SaveTicket};
use crate::error::{BuilderError, Result};

use super::PagePersistence;

/// In-process page store. Useful for demos and tests; failures can be
/// scripted with [`MemoryPersistence::fail_next`].
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    pages: HashMap<String, PageDocument>,
    reports: Vec<SaveReport>,
    fail_next: Option<String>,
    reject_next: Option<String>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page_id: impl Into<String>, document: PageDocument) -> Self {
        self.pages.insert(page_id.into(), document);
        self
    }

    pub fn page(&self, page_id: &str) -> Option<&PageDocument> {
        self.pages.get(page_id)
    }

    /// Accept the next submission but report it as failed.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    /// Refuse the next submission outright.
    pub fn reject_next(&mut self, message: impl Into<String>) {
        self.reject_next = Some(message.into());
    }
}

impl PagePersistence for MemoryPersistence {
    fn submit(&mut self, page_id: &str, ticket: SaveTicket, document: PageDocument) -> Result<()> {
        if let Some(message) = self.reject_next.take() {
            return Err(BuilderError::Persistence(message));
        }
        if let Some(message) = self.fail_next.take() {
            self.reports.push(SaveReport::failed(ticket, message));
            return Ok(());
        }
        self.pages.insert(page_id.to_string(), document);
        self.reports.push(SaveReport::succeeded(ticket));
        Ok(())
    }

    fn load(&self, page_id: &str) -> Result<PageDocument> {
        self.pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| BuilderError::PageNotFound(page_id.to_string()))
    }

    fn poll_reports(&mut self) -> Vec<SaveReport> {
        std::mem::take(&mut self.reports)
    }
}
