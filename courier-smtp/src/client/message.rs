//! Message framing for the DATA phase.

use std::fmt::Write as _;

use crate::encoding::{self, CHARSET, TRANSFER_ENCODING};

/// Builds the text sent after `DATA`: a fixed set of headers followed by
/// the escaped body.
///
/// Header lines end in CRLF and are separated from the body by an empty
/// line. The subject is wrapped in an RFC 2047 encoded-word, the body is
/// escaped with [`encoding::encode_body`].
///
/// ```
/// use courier_smtp::client::MessageBuilder;
///
/// let message = MessageBuilder::new()
///     .from("a@x.com")
///     .to("b@y.com")
///     .subject("Hi")
///     .date("Thu, 01 Jan 2026 10:00:00 +0000")
///     .body("Hello")
///     .build();
///
/// assert!(message.contains("Subject: =?ISO-8859-15?Q?=48=69?=\r\n"));
/// assert!(message.ends_with("\r\n\r\n=48=65=6C=6C=6F"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Option<String>,
    subject: Option<String>,
    date: Option<String>,
    body: String,
}

impl MessageBuilder {
    /// Creates a new empty message builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from(mut self, email: impl Into<String>) -> Self {
        self.from = Some(email.into());
        self
    }

    #[must_use]
    pub fn to(mut self, email: impl Into<String>) -> Self {
        self.to = Some(email.into());
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the Date header, already formatted.
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the unencoded message body.
    #[must_use]
    pub fn body(mut self, content: impl Into<String>) -> Self {
        self.body = content.into();
        self
    }

    /// Renders the message.
    #[must_use]
    pub fn build(self) -> String {
        let mut message = String::with_capacity(512 + self.body.len() * 3);

        if let Some(from) = &self.from {
            let _ = write!(message, "From: <{from}>\r\n");
        }

        if let Some(to) = &self.to {
            let _ = write!(message, "To: <{to}>\r\n");
        }

        if let Some(subject) = &self.subject {
            let _ = write!(
                message,
                "Subject: =?{CHARSET}?Q?{}?=\r\n",
                encoding::encode_header(subject)
            );
        }

        if let Some(date) = &self.date {
            let _ = write!(message, "Date: {date}\r\n");
        }

        let _ = write!(
            message,
            "MIME-Version: 1.0\r\n\
            Content-Type: text/plain; charset={CHARSET}\r\n\
            Content-Transfer-Encoding: {TRANSFER_ENCODING}\r\n\
            \r\n"
        );

        message.push_str(&encoding::encode_body(&self.body));

        message
    }
}
