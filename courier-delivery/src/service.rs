//! The delivery agent and the service trait front-ends talk to
//!
//! [`DeliveryAgent`] ties validation, the pending queue, the scheduler, the
//! SMTP transaction and confirmations together. Front-ends only need
//! [`SubmissionService`], which keeps them testable without DNS or sockets.

use std::sync::Arc;

use async_trait::async_trait;
use courier_common::{
    EmailSubmission, SubmissionRequest, address, internal,
    tracing::{debug, warn},
};
use tokio::sync::broadcast;

use crate::{
    confirmation::compose_confirmation,
    dns::Resolver,
    queue::PendingQueue,
    scheduler::Scheduler,
    transaction::SmtpTransaction,
    types::{DeliveryConfig, DeliveryOutcome, DeliveryReport},
    validate::{ValidationError, validate},
};

const REPORT_CHANNEL_CAPACITY: usize = 64;

/// Operations exposed to front-ends
///
/// # Example
///
/// ```rust,ignore
/// async fn handle(service: &dyn SubmissionService, request: SubmissionRequest) -> String {
///     service.submit(&request).await
/// }
/// ```
#[async_trait]
pub trait SubmissionService: Send + Sync {
    /// Validates and, if valid, queues and schedules a submission.
    ///
    /// Returns the message to show the submitter: the validation error, or
    /// the confirmation that the email will be sent.
    async fn submit(&self, request: &SubmissionRequest) -> String;

    /// Snapshot of the submissions not yet attempted, oldest first.
    fn list_pending(&self) -> Vec<Arc<EmailSubmission>>;
}

/// Accepts submissions and delivers them once their delay has elapsed.
///
/// Cheap to clone; clones share the same queue and report channel.
#[derive(Clone)]
pub struct DeliveryAgent {
    inner: Arc<Inner>,
}

struct Inner {
    config: DeliveryConfig,
    resolver: Arc<dyn Resolver>,
    queue: PendingQueue,
    scheduler: Scheduler,
    reports: broadcast::Sender<DeliveryReport>,
}

impl DeliveryAgent {
    /// Creates an agent that schedules on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    #[must_use]
    pub fn new(config: DeliveryConfig, resolver: Arc<dyn Resolver>) -> Self {
        Self::with_scheduler(config, resolver, Scheduler::current())
    }

    #[must_use]
    pub fn with_scheduler(
        config: DeliveryConfig,
        resolver: Arc<dyn Resolver>,
        scheduler: Scheduler,
    ) -> Self {
        let (reports, _receiver) = broadcast::channel(REPORT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                config,
                resolver,
                queue: PendingQueue::new(),
                scheduler,
                reports,
            }),
        }
    }

    /// Receives a [`DeliveryReport`] for every attempt made after subscribing.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryReport> {
        self.inner.reports.subscribe()
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.inner.config
    }
}

#[async_trait]
impl SubmissionService for DeliveryAgent {
    async fn submit(&self, request: &SubmissionRequest) -> String {
        let validated = match validate(request, self.inner.resolver.as_ref()).await {
            Ok(validated) => validated,
            Err(err) => {
                internal!(
                    level = INFO,
                    "Rejected email from {} to {}: {err}",
                    request.source,
                    request.destination
                );
                return err.to_string();
            }
        };

        let submission = match EmailSubmission::new(
            request.source.as_str(),
            request.destination.as_str(),
            request.subject.as_str(),
            validated.relay_host,
            validated.delay_secs,
            &request.body,
        ) {
            Ok(submission) => Arc::new(submission),
            Err(err) => {
                internal!(level = WARN, "Rejected email from {}: {err}", request.source);
                return ValidationError::InvalidDelay.to_string();
            }
        };

        internal!(
            level = INFO,
            "Accepted email {} from {} to {} via {}, sending at {}",
            submission.id(),
            submission.source(),
            submission.destination(),
            submission.relay_host(),
            submission.send_time()
        );

        self.inner.queue.add(Arc::clone(&submission));
        self.inner.schedule(submission, true);

        format!(
            "The email will be sent in {} seconds",
            validated.delay_secs
        )
    }

    fn list_pending(&self) -> Vec<Arc<EmailSubmission>> {
        self.inner.queue.snapshot()
    }
}

impl Inner {
    fn schedule(self: &Arc<Self>, submission: Arc<EmailSubmission>, needs_confirmation: bool) {
        let inner = Arc::clone(self);
        self.scheduler
            .schedule(submission, needs_confirmation, move |submission, confirm| {
                inner.attempt(submission, confirm)
            });
    }

    async fn attempt(self: Arc<Self>, submission: Arc<EmailSubmission>, needs_confirmation: bool) {
        let outcome = SmtpTransaction::new(
            &submission,
            &self.config.helo_identity,
            self.config.smtp_port,
        )
        .execute()
        .await;

        if !self.queue.remove(&submission) {
            debug!("{} was not in the pending queue", submission.id());
        }

        match &outcome {
            DeliveryOutcome::Delivered => internal!(
                level = INFO,
                "Email {} to {} sent successfully",
                submission.id(),
                submission.destination()
            ),
            DeliveryOutcome::Failed { diagnostic } => internal!(
                level = WARN,
                "Unable to send email {} to {}: {diagnostic}",
                submission.id(),
                submission.destination()
            ),
        }

        // Nobody listening is fine
        let _ = self.reports.send(DeliveryReport {
            submission: Arc::clone(&submission),
            outcome: outcome.clone(),
            confirmation: !needs_confirmation,
        });

        if needs_confirmation {
            self.confirm(&submission, &outcome).await;
        }
    }

    async fn confirm(self: &Arc<Self>, original: &EmailSubmission, outcome: &DeliveryOutcome) {
        let domain = address::domain_of(original.source());
        let relay = self.resolver.mx_host(domain).await;

        if relay.is_empty() {
            warn!(
                "No SMTP server found for {domain}, dropping confirmation of {}",
                original.id()
            );
            return;
        }

        let confirmation =
            match compose_confirmation(original, outcome, &self.config.server_identity, &relay) {
                Ok(confirmation) => confirmation,
                Err(err) => {
                    warn!("Unable to compose confirmation of {}: {err}", original.id());
                    return;
                }
            };
        debug!(
            "Sending confirmation {} of {} to {} via {relay}",
            confirmation.id(),
            original.id(),
            confirmation.destination()
        );

        self.schedule(Arc::new(confirmation), false);
    }
}
