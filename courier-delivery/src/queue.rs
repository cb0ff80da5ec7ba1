//! Submissions accepted but not yet attempted

use std::sync::Arc;

use courier_common::EmailSubmission;
use parking_lot::Mutex;

/// Ordered set of pending submissions, keyed by submission id.
///
/// Cloning shares the same underlying queue.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    entries: Arc<Mutex<Vec<Arc<EmailSubmission>>>>,
}

impl PendingQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `submission` unless one with the same id is already queued.
    pub fn add(&self, submission: Arc<EmailSubmission>) {
        let mut entries = self.entries.lock();
        if !entries.iter().any(|queued| queued.id() == submission.id()) {
            entries.push(submission);
        }
    }

    /// Removes the entry with the same id as `submission`.
    ///
    /// Returns `false` if nothing was queued under that id.
    pub fn remove(&self, submission: &EmailSubmission) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|queued| queued.id() != submission.id());
        entries.len() != before
    }

    /// Copy of the queue in insertion order, safe to iterate while the
    /// queue keeps changing.
    pub fn snapshot(&self) -> Vec<Arc<EmailSubmission>> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
