//! Page document assembly and the save bookkeeping around it.

mod assemble;
mod save;

pub use assemble::{PageDocument, PageMetadata, assemble};
pub use save::{SaveOutcome, SaveReport, SaveStatus, SaveTicket, SaveTracker};
