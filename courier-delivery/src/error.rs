//! Errors raised inside a single SMTP transaction.
//!
//! They never leave the engine: every variant is folded into a
//! [`DeliveryOutcome::Failed`](crate::DeliveryOutcome::Failed) whose
//! diagnostic is the variant's `Display`.

use courier_smtp::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    /// Connecting, writing or reading failed.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// The relay answered a step with an unexpected code.
    #[error("{reply}")]
    Rejected {
        step: &'static str,
        /// Final reply line, e.g. `550 Mailbox unavailable`
        reply: String,
    },
}

impl TransactionError {
    /// Text reported back to the sender.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        self.to_string()
    }
}
