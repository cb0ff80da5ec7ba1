//! Web front-end: compose form, pending list and submission endpoint

mod error;
pub mod pages;

use std::{sync::Arc, time::Duration};

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use courier_common::{Signal, SubmissionRequest, internal};
use courier_delivery::SubmissionService;
use serde::Deserialize;
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::timeout::TimeoutLayer;

pub use self::error::HttpError;
use crate::config::HttpConfig;

/// Upper bound on handling one request. Validation may wait on DNS.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type Service = Arc<dyn SubmissionService>;

/// Fields of the compose form
#[derive(Debug, Deserialize)]
pub struct ComposeForm {
    from: String,
    to: String,
    subject: String,
    #[serde(rename = "smtpServer")]
    smtp_server: String,
    #[serde(rename = "delayTime")]
    delay_time: String,
    message: String,
}

impl From<ComposeForm> for SubmissionRequest {
    fn from(form: ComposeForm) -> Self {
        Self {
            source: form.from.trim().to_string(),
            destination: form.to.trim().to_string(),
            subject: form.subject.trim().to_string(),
            relay_host: form.smtp_server.trim().to_string(),
            delay: form.delay_time.trim().to_string(),
            body: form.message.trim().to_string(),
        }
    }
}

/// Builds the front-end routes on top of `service`.
pub fn router(service: Service) -> Router {
    Router::new()
        .route("/", get(index).fallback(not_found))
        .route("/status", get(status).fallback(not_found))
        .route("/composeEmail", post(compose_email).fallback(not_found))
        .fallback(not_found)
        .with_state(service)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}

/// HTTP server for the front-end
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
}

impl HttpServer {
    /// Binds the listener.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the configured address fails.
    pub async fn new(config: &HttpConfig, service: Service) -> Result<Self, HttpError> {
        let listener = TcpListener::bind(&config.listen_address)
            .await
            .map_err(|e| HttpError::BindError {
                address: config.listen_address.clone(),
                source: e,
            })?;

        tracing::info!(address = %config.listen_address, "HTTP server bound successfully");

        Ok(Self {
            listener,
            router: router(service),
        })
    }

    /// Serves requests until a shutdown signal is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a runtime error.
    pub async fn serve(self, mut shutdown: broadcast::Receiver<Signal>) -> Result<(), HttpError> {
        internal!(level = INFO, "The HTTP server is running...");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await
            .map_err(|e| HttpError::ServerError(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn index() -> Html<&'static str> {
    Html(pages::INDEX)
}

async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html(pages::NOT_FOUND))
}

async fn status(State(service): State<Service>) -> Html<String> {
    Html(pages::status(&service.list_pending()))
}

async fn compose_email(
    State(service): State<Service>,
    form: Result<Form<ComposeForm>, FormRejection>,
) -> Html<String> {
    internal!(level = DEBUG, "Receiving a sending email request...");

    let message = match form {
        Ok(Form(form)) => service.submit(&form.into()).await,
        Err(rejection) => {
            tracing::debug!("Rejected compose form: {rejection}");
            String::from("Invalid data")
        }
    };

    Html(pages::compose_result(&message))
}
