//! DNS lookups needed to accept and route a submission.
//!
//! Both lookups are best effort: a failed query, a timeout and an empty
//! answer all look the same to the caller (an empty host or `false`). Nothing
//! is retried and nothing is cached; every submission asks again.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use courier_common::tracing::{debug, warn};
use hickory_resolver::{
    TokioResolver,
    config::ResolverOpts,
    name_server::TokioConnectionProvider,
};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while setting up the resolver.
#[derive(Debug, Error)]
pub enum DnsError {
    /// The system resolver configuration could not be loaded.
    #[error("Failed to initialise DNS resolver: {0}")]
    Init(#[from] hickory_resolver::ResolveError),
}

/// Configuration for the DNS resolver.
#[derive(Debug, Clone, Deserialize)]
pub struct DnsConfig {
    /// Query timeout in seconds (default: 5)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    5
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// A mail exchange record: target host and preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailExchange {
    pub host: String,
    /// Lower value = more preferred.
    pub priority: u16,
}

impl MailExchange {
    #[must_use]
    pub fn new(host: impl Into<String>, priority: u16) -> Self {
        Self {
            host: host.into(),
            priority,
        }
    }
}

/// Picks the exchange with the lowest priority value. On a tie the first
/// record in answer order wins.
pub fn select_exchange<'a, I>(records: I) -> Option<&'a MailExchange>
where
    I: IntoIterator<Item = &'a MailExchange>,
{
    records
        .into_iter()
        .fold(None, |best: Option<&MailExchange>, record| match best {
            Some(current) if current.priority <= record.priority => Some(current),
            _ => Some(record),
        })
}

/// Name lookups used by validation, delivery and confirmation.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Host of the preferred mail exchange for `domain`, or an empty string
    /// if there is none or the lookup failed.
    async fn mx_host(&self, domain: &str) -> String;

    /// `true` iff an address lookup for `name` succeeds with at least one record.
    async fn domain_exists(&self, name: &str) -> bool;
}

/// Resolver backed by real DNS queries.
#[derive(Debug)]
pub struct DnsResolver {
    resolver: TokioResolver,
}

impl DnsResolver {
    /// Creates a resolver from the system configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the system DNS configuration cannot be loaded.
    pub fn new() -> Result<Self, DnsError> {
        Self::with_dns_config(&DnsConfig::default())
    }

    /// Creates a resolver from the system configuration with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be initialized.
    pub fn with_dns_config(dns_config: &DnsConfig) -> Result<Self, DnsError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(dns_config.timeout_secs);

        let resolver = TokioResolver::builder(TokioConnectionProvider::default())?
            .with_options(opts)
            .build();

        Ok(Self { resolver })
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn mx_host(&self, domain: &str) -> String {
        debug!("Looking up SMTP server for domain: {domain}");

        let records = match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => lookup
                .iter()
                .map(|mx| {
                    let host = mx.exchange().to_utf8();
                    MailExchange::new(host.trim_end_matches('.'), mx.preference())
                })
                .collect::<Vec<_>>(),
            Err(err) => {
                warn!("MX lookup failed for {domain}: {err}");
                return String::new();
            }
        };

        let host = select_exchange(&records)
            .map(|exchange| exchange.host.clone())
            .unwrap_or_default();
        debug!("SMTP server of {domain} is: {host:?}");

        host
    }

    async fn domain_exists(&self, name: &str) -> bool {
        match self.resolver.lookup_ip(name).await {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(err) => {
                debug!("Address lookup failed for {name}: {err}");
                false
            }
        }
    }
}

/// Resolver with fixed answers, for tests and closed networks.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    exchanges: HashMap<String, Vec<MailExchange>>,
    hosts: Vec<String>,
}

impl StaticResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an MX record for `domain`. Records keep insertion order.
    #[must_use]
    pub fn with_mx(mut self, domain: &str, host: &str, priority: u16) -> Self {
        self.exchanges
            .entry(domain.to_ascii_lowercase())
            .or_default()
            .push(MailExchange::new(host, priority));
        self
    }

    /// Makes `name` resolve to an address.
    #[must_use]
    pub fn with_host(mut self, name: &str) -> Self {
        self.hosts.push(name.to_ascii_lowercase());
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn mx_host(&self, domain: &str) -> String {
        self.exchanges
            .get(&domain.to_ascii_lowercase())
            .and_then(|records| select_exchange(records))
            .map(|exchange| exchange.host.clone())
            .unwrap_or_default()
    }

    async fn domain_exists(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.hosts.iter().any(|host| *host == name)
    }
}
