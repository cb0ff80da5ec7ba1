//! Confirmation emails telling the original sender how delivery went

use courier_common::{EmailSubmission, SubmissionError};

use crate::types::DeliveryOutcome;

const DELIVERED_HEADLINE: &str = "Your email has been sent successfully !!!";
const FAILED_HEADLINE: &str = "Unable to send to the email !!!";

/// Builds the confirmation for `original`, sent from `sender` through `relay`.
///
/// The body quotes the original submission; a failure additionally ends
/// with a `Diagnostic:` line. Confirmations are sent immediately.
///
/// # Errors
///
/// Propagates the [`SubmissionError`] of building the confirmation.
pub fn compose_confirmation(
    original: &EmailSubmission,
    outcome: &DeliveryOutcome,
    sender: &str,
    relay: &str,
) -> Result<EmailSubmission, SubmissionError> {
    let (subject, body) = match outcome {
        DeliveryOutcome::Delivered => (
            format!("Mail delivered successfully \"{}\"", original.subject()),
            format!("{DELIVERED_HEADLINE}\r\n\r\n{}", original.render()),
        ),
        DeliveryOutcome::Failed { diagnostic } => (
            format!("Unable to deliver the email \"{}\"", original.subject()),
            format!(
                "{FAILED_HEADLINE}\r\n\r\n{}Diagnostic: {diagnostic}",
                original.render()
            ),
        ),
    };

    EmailSubmission::new(sender, original.source(), subject, relay, 0, &body)
}
