pub mod address;
pub mod logging;
pub mod submission;

pub use submission::{
    EmailSubmission, MAX_DELAY_SECS, SubmissionError, SubmissionId, SubmissionRequest,
};
pub use tracing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
}
