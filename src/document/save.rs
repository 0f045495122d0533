use std::collections::HashMap;
use std::fmt;

/// Identifier of one submitted save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveTicket(u64);

impl SaveTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SaveTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "save#{}", self.0)
    }
}

/// Result reported by the persistence collaborator for one request.
pub type SaveOutcome = std::result::Result<(), String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub ticket: SaveTicket,
    pub outcome: SaveOutcome,
}

impl SaveReport {
    pub fn succeeded(ticket: SaveTicket) -> Self {
        Self {
            ticket,
            outcome: Ok(()),
        }
    }

    pub fn failed(ticket: SaveTicket, message: impl Into<String>) -> Self {
        Self {
            ticket,
            outcome: Err(message.into()),
        }
    }
}

/// Operator-visible save indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Pending {
        ticket: SaveTicket,
    },
    Saved {
        ticket: SaveTicket,
    },
    /// The operator may retry; a retry re-assembles the current layout.
    Failed {
        ticket: SaveTicket,
        message: String,
    },
}

/// Bookkeeping for in-flight saves.
///
/// Saves may race; whichever response arrives last decides the status.
/// Nothing here ever touches the layout store.
#[derive(Debug, Default)]
pub struct SaveTracker {
    next_ticket: u64,
    in_flight: HashMap<SaveTicket, blake3::Hash>,
    status: SaveStatus,
    last_saved: Option<blake3::Hash>,
}

impl SaveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request for a document with the given fingerprint.
    pub fn begin(&mut self, fingerprint: blake3::Hash) -> SaveTicket {
        self.next_ticket += 1;
        let ticket = SaveTicket(self.next_ticket);
        self.in_flight.insert(ticket, fingerprint);
        self.status = SaveStatus::Pending { ticket };
        ticket
    }

    /// Apply a response. Reports for unknown or already completed tickets
    /// are dropped and yield `false`.
    pub fn complete(&mut self, report: SaveReport) -> bool {
        let Some(fingerprint) = self.in_flight.remove(&report.ticket) else {
            return false;
        };

        self.status = match report.outcome {
            Ok(()) => {
                self.last_saved = Some(fingerprint);
                SaveStatus::Saved {
                    ticket: report.ticket,
                }
            }
            Err(message) => SaveStatus::Failed {
                ticket: report.ticket,
                message,
            },
        };
        true
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a document with this fingerprint is the last one persisted.
    pub fn is_saved(&self, fingerprint: &blake3::Hash) -> bool {
        self.last_saved.as_ref() == Some(fingerprint)
    }

    /// Treat a freshly loaded document as already persisted.
    pub fn mark_loaded(&mut self, fingerprint: blake3::Hash) {
        self.in_flight.clear();
        self.status = SaveStatus::Idle;
        self.last_saved = Some(fingerprint);
    }
}
