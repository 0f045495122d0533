//! Persistence collaborators the editor hands assembled documents to.
//!
//! Saves are submitted without waiting; completion is picked up later
//! through [`PagePersistence::poll_reports`].

mod json_dir;
mod memory;

pub use json_dir::JsonDirPersistence;
pub use memory::MemoryPersistence;

use crate::Result;
use crate::document::{PageDocument, SaveReport, SaveTicket};

pub trait PagePersistence {
    /// Hand a document over for saving. An `Err` means the request was never
    /// accepted; failures after acceptance arrive as reports.
    fn submit(&mut self, page_id: &str, ticket: SaveTicket, document: PageDocument) -> Result<()>;

    fn load(&self, page_id: &str) -> Result<PageDocument>;

    /// Drain responses that arrived since the last poll.
    fn poll_reports(&mut self) -> Vec<SaveReport>;
}
