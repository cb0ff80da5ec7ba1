use std::sync::{Arc, LazyLock};

use courier_common::{Signal, internal, logging, tracing};
use courier_delivery::{DeliveryAgent, DnsResolver, SubmissionService};
use tokio::sync::broadcast;

use crate::{config::Config, http::HttpServer};

pub static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(64);
    sender
});

#[tracing::instrument(level = tracing::Level::TRACE)]
async fn shutdown() -> anyhow::Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            internal!(level = INFO, "CTRL+C entered, shutting down");
        }
        _ = terminate.recv() => {
            internal!(level = INFO, "Terminate Signal received, shutting down");
        }
    };

    SHUTDOWN_BROADCAST
        .send(Signal::Shutdown)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;

    Ok(())
}

/// The running agent: delivery engine plus web front-end
pub struct Courier {
    config: Config,
}

impl Courier {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs until the front-end stops or a shutdown signal arrives.
    ///
    /// Submissions still waiting for their delay are lost on shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be initialised or the
    /// front-end cannot bind its address.
    #[tracing::instrument(level = tracing::Level::TRACE, skip_all, err)]
    pub async fn run(self) -> anyhow::Result<()> {
        logging::init();

        let resolver = DnsResolver::with_dns_config(&self.config.delivery.dns)?;
        let agent = DeliveryAgent::new(self.config.delivery.clone(), Arc::new(resolver));
        let server = HttpServer::new(&self.config.http, Arc::new(agent.clone())).await?;

        internal!(
            level = INFO,
            "Courier running, HELO as {} on port {}",
            agent.config().helo_identity,
            agent.config().smtp_port
        );

        let serve = server.serve(SHUTDOWN_BROADCAST.subscribe());
        tokio::pin!(serve);

        let ret = tokio::select! {
            r = &mut serve => r.map_err(anyhow::Error::from),
            r = shutdown() => match r {
                // Let in-flight requests finish
                Ok(()) => serve.await.map_err(anyhow::Error::from),
                Err(e) => Err(e),
            },
        };

        let pending = agent.list_pending().len();
        if pending > 0 {
            internal!(level = WARN, "Shutting down with {pending} pending emails");
        } else {
            internal!(level = INFO, "Shutting down...");
        }

        ret
    }
}
