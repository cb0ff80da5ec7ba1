//! Validation, scheduling and SMTP delivery of delayed submissions
//!
//! This crate provides:
//! - DNS lookups of relays and their existence (behind the [`Resolver`] trait)
//! - Validation of raw submissions
//! - The pending queue and the delay scheduler
//! - The SMTP transaction performing a delivery
//! - Confirmation emails reporting the outcome to the sender

mod confirmation;
mod dns;
mod error;
pub mod queue;
mod scheduler;
mod service;
mod transaction;
mod types;
mod validate;

pub use confirmation::compose_confirmation;
pub use dns::{DnsConfig, DnsError, DnsResolver, MailExchange, Resolver, StaticResolver, select_exchange};
pub use error::TransactionError;
pub use queue::PendingQueue;
pub use scheduler::Scheduler;
pub use service::{DeliveryAgent, SubmissionService};
pub use transaction::SmtpTransaction;
pub use types::{DeliveryConfig, DeliveryOutcome, DeliveryReport};
pub use validate::{Validated, ValidationError, validate};
