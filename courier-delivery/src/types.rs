//! Type definitions shared by the delivery engine and its callers

use std::{fmt, sync::Arc};

use courier_common::EmailSubmission;
use serde::Deserialize;

use crate::dns::DnsConfig;

/// Delivery engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Identity announced in `HELO`
    ///
    /// Default: `localhost.com`
    #[serde(default = "default_helo_identity")]
    pub helo_identity: String,

    /// Sender address of confirmation emails
    ///
    /// Default: `server@localhost.com`
    #[serde(default = "default_server_identity")]
    pub server_identity: String,

    /// TCP port relays are contacted on
    ///
    /// Default: 25
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub dns: DnsConfig,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            helo_identity: default_helo_identity(),
            server_identity: default_server_identity(),
            smtp_port: default_smtp_port(),
            dns: DnsConfig::default(),
        }
    }
}

fn default_helo_identity() -> String {
    String::from("localhost.com")
}

fn default_server_identity() -> String {
    String::from("server@localhost.com")
}

const fn default_smtp_port() -> u16 {
    25
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// `diagnostic` is the offending reply line or the I/O failure text
    Failed { diagnostic: String },
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::Failed { diagnostic } => write!(f, "failed ({diagnostic})"),
        }
    }
}

/// Published to subscribers after every delivery attempt, confirmations included
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub submission: Arc<EmailSubmission>,
    pub outcome: DeliveryOutcome,
    /// Whether the attempt was for a confirmation email
    pub confirmation: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeliveryConfig::default();
        assert_eq!(config.helo_identity, "localhost.com");
        assert_eq!(config.server_identity, "server@localhost.com");
        assert_eq!(config.smtp_port, 25);
        assert_eq!(config.dns.timeout_secs, 5);
    }

    #[test]
    fn test_partial_ron_falls_back_to_defaults() {
        let config: DeliveryConfig = ron::from_str("(smtp_port: 2525)").unwrap();
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.helo_identity, "localhost.com");
        assert_eq!(config.dns.timeout_secs, 5);

        let config: DeliveryConfig =
            ron::from_str(r#"(server_identity: "robot@example.org", dns: (timeout_secs: 2))"#)
                .unwrap();
        assert_eq!(config.server_identity, "robot@example.org");
        assert_eq!(config.dns.timeout_secs, 2);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(DeliveryOutcome::Delivered.to_string(), "delivered");
        let failed = DeliveryOutcome::Failed {
            diagnostic: "550 Mailbox unavailable".to_string(),
        };
        assert_eq!(failed.to_string(), "failed (550 Mailbox unavailable)");
    }
}
