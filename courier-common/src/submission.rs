//! Submitted emails, from raw form data to the immutable record that is queued

use std::{fmt, sync::Arc};

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Format used when showing submission and send times to people.
pub const DISPLAY_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Longest accepted delay, `i32::MAX` seconds (a little over 68 years).
pub const MAX_DELAY_SECS: u64 = 2_147_483_647;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Delay of {0} seconds is out of range")]
    DelayOutOfRange(u64),
}

/// Raw, unvalidated fields of a submission as handed over by a front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionRequest {
    pub source: String,
    pub destination: String,
    pub subject: String,
    /// Empty when the relay should be looked up from the destination domain
    pub relay_host: String,
    /// Delay in seconds, still unparsed
    pub delay: String,
    pub body: String,
}

/// Identity of a single accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(Ulid);

impl SubmissionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An accepted email. Nothing about it changes after construction; the send
/// time is fixed to `submitted_at + delay` right here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSubmission {
    id: SubmissionId,
    source: Arc<str>,
    destination: Arc<str>,
    subject: Arc<str>,
    relay_host: Arc<str>,
    delay_secs: u64,
    body: Arc<str>,
    submitted_at: DateTime<Local>,
    send_at: DateTime<Local>,
}

impl EmailSubmission {
    /// Create a submission stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::DelayOutOfRange`] if `delay_secs` exceeds
    /// [`MAX_DELAY_SECS`] or the send time cannot be represented.
    pub fn new(
        source: impl Into<Arc<str>>,
        destination: impl Into<Arc<str>>,
        subject: impl Into<Arc<str>>,
        relay_host: impl Into<Arc<str>>,
        delay_secs: u64,
        body: &str,
    ) -> Result<Self, SubmissionError> {
        let submitted_at = Local::now();
        let send_at = Some(delay_secs)
            .filter(|secs| *secs <= MAX_DELAY_SECS)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(TimeDelta::try_seconds)
            .and_then(|delay| submitted_at.checked_add_signed(delay))
            .ok_or(SubmissionError::DelayOutOfRange(delay_secs))?;

        Ok(Self {
            id: SubmissionId::generate(),
            source: source.into(),
            destination: destination.into(),
            subject: subject.into(),
            relay_host: relay_host.into(),
            delay_secs,
            body: Arc::from(body.trim()),
            submitted_at,
            send_at,
        })
    }

    pub const fn id(&self) -> SubmissionId {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn relay_host(&self) -> &str {
        &self.relay_host
    }

    pub const fn delay_secs(&self) -> u64 {
        self.delay_secs
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub const fn submitted_at(&self) -> DateTime<Local> {
        self.submitted_at
    }

    pub const fn send_at(&self) -> DateTime<Local> {
        self.send_at
    }

    pub fn submitted_time(&self) -> String {
        self.submitted_at.format(DISPLAY_TIME_FORMAT).to_string()
    }

    pub fn send_time(&self) -> String {
        self.send_at.format(DISPLAY_TIME_FORMAT).to_string()
    }

    /// Full human-readable rendering, as quoted back in confirmation emails.
    pub fn render(&self) -> String {
        format!(
            "From: {source}\r\n\
            To: {destination}\r\n\
            Subject: {subject}\r\n\
            Submitted time: {submitted}\r\n\
            Sent time: {sent}\r\n\
            \r\n\
            Content: \r\n\
            {body}\r\n",
            source = self.source,
            destination = self.destination,
            subject = self.subject,
            submitted = self.submitted_time(),
            sent = self.send_time(),
            body = self.body,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn submission(delay_secs: u64) -> EmailSubmission {
        EmailSubmission::new(
            "a@x.com",
            "b@y.com",
            "Hello",
            "mail.y.com",
            delay_secs,
            "  Body text \r\n",
        )
        .unwrap()
    }

    #[test]
    fn test_send_time_is_submitted_plus_delay() {
        for delay in [0, 1, 59, 3600, 86_400 * 7] {
            let email = submission(delay);
            assert_eq!(
                email.send_at() - email.submitted_at(),
                TimeDelta::try_seconds(i64::try_from(delay).unwrap()).unwrap()
            );
        }
    }

    #[test]
    fn test_longest_delay_is_accepted() {
        let email = submission(MAX_DELAY_SECS);
        assert_eq!(
            email.send_at() - email.submitted_at(),
            TimeDelta::try_seconds(2_147_483_647).unwrap()
        );
    }

    #[test]
    fn test_delay_out_of_range() {
        for delay in [MAX_DELAY_SECS + 1, 10_000_000_000_000, u64::MAX] {
            let result = EmailSubmission::new("a@x.com", "b@y.com", "Hi", "mail.y.com", delay, "");
            assert_eq!(result, Err(SubmissionError::DelayOutOfRange(delay)));
        }
    }

    #[test]
    fn test_body_is_trimmed() {
        assert_eq!(submission(0).body(), "Body text");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(submission(0).id(), submission(0).id());
    }

    #[test]
    fn test_render() {
        let email = submission(5);
        let expected = format!(
            "From: a@x.com\r\nTo: b@y.com\r\nSubject: Hello\r\nSubmitted time: {}\r\nSent time: {}\r\n\r\nContent: \r\nBody text\r\n",
            email.submitted_time(),
            email.send_time()
        );
        assert_eq!(email.render(), expected);
    }
}
