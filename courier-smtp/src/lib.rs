//! Outbound half of SMTP as courier speaks it: a small line-oriented client
//! and the byte-escaping used for subject and body.

pub mod client;
pub mod encoding;

pub use client::{ClientError, MessageBuilder, Response, SmtpClient};
