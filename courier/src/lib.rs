//! Delayed SMTP submission agent
//!
//! Emails are composed through a small web front-end, held for the requested
//! delay and then delivered straight to the recipient's mail exchange. The
//! sender gets a confirmation email telling them how it went.

pub mod config;
pub mod controller;
pub mod http;
