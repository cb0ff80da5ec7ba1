//! One delivery attempt: a single SMTP conversation with the relay.
//!
//! The conversation is strict. Every step must be answered with one exact
//! code; anything else ends the attempt and the final reply line becomes the
//! diagnostic. Only `QUIT` is fire and forget.

use courier_common::{
    EmailSubmission,
    tracing::{self, debug},
};
use courier_smtp::{MessageBuilder, Response, SmtpClient};

use crate::{error::TransactionError, types::DeliveryOutcome};

/// Delivery of one submission to its relay
pub struct SmtpTransaction<'a> {
    submission: &'a EmailSubmission,
    helo_identity: &'a str,
    port: u16,
}

impl<'a> SmtpTransaction<'a> {
    #[must_use]
    pub const fn new(submission: &'a EmailSubmission, helo_identity: &'a str, port: u16) -> Self {
        Self {
            submission,
            helo_identity,
            port,
        }
    }

    /// Runs the conversation and folds any failure into the outcome.
    #[tracing::instrument(
        level = tracing::Level::INFO,
        skip(self),
        fields(id = %self.submission.id(), relay = %self.submission.relay_host())
    )]
    pub async fn execute(self) -> DeliveryOutcome {
        match self.run().await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(err) => {
                debug!("Delivery aborted: {err:?}");
                DeliveryOutcome::Failed {
                    diagnostic: err.diagnostic(),
                }
            }
        }
    }

    async fn run(&self) -> Result<(), TransactionError> {
        let mut client = SmtpClient::connect(self.submission.relay_host(), self.port).await?;

        let result = self.converse(&mut client).await;

        if let Err(err) = client.close().await {
            debug!("Failed to shut down connection cleanly: {err}");
        }

        result
    }

    async fn converse(&self, client: &mut SmtpClient) -> Result<(), TransactionError> {
        expect("greeting", 220, client.read_greeting().await?)?;
        expect("HELO", 250, client.helo(self.helo_identity).await?)?;
        expect(
            "MAIL FROM",
            250,
            client.mail_from(self.submission.source()).await?,
        )?;
        expect(
            "RCPT TO",
            250,
            client.rcpt_to(self.submission.destination()).await?,
        )?;
        expect("DATA", 354, client.data().await?)?;
        expect("message", 250, client.send_data(&self.message()).await?)?;

        if let Err(err) = client.quit().await {
            debug!("QUIT could not be sent after delivery: {err}");
        }

        Ok(())
    }

    fn message(&self) -> String {
        MessageBuilder::new()
            .from(self.submission.source())
            .to(self.submission.destination())
            .subject(self.submission.subject())
            .date(self.submission.send_at().to_rfc2822())
            .body(self.submission.body())
            .build()
    }
}

fn expect(step: &'static str, code: u16, response: Response) -> Result<(), TransactionError> {
    if response.code == code {
        Ok(())
    } else {
        Err(TransactionError::Rejected {
            step,
            reply: response.reply_line(),
        })
    }
}
