//! Mock SMTP relay for delivery tests
//!
//! This module provides a configurable mock relay that can:
#![allow(dead_code)] // Test utility module - not all methods used in every test
//! - Answer each step with a configurable reply
//! - Reject selected recipients only
//! - Record every connection as a session of received commands
//!
//! # Example
//!
//! ```rust,no_run
//! use support::mock_server::MockSmtpServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = MockSmtpServer::builder()
//!     .with_greeting(220, "Test server ready")
//!     .with_rejected_recipient("b@y.com", 550, "Mailbox unavailable")
//!     .build()
//!     .await?;
//!
//! // Deliver to 127.0.0.1:server.port(), then inspect
//! let sessions = server.wait_for_sessions(1).await;
//!
//! server.shutdown();
//! # Ok(())
//! # }
//! ```

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::RwLock,
    time::timeout,
};

/// How long [`MockSmtpServer::wait_for_sessions`] waits before giving up.
const WAIT_LIMIT: Duration = Duration::from_secs(10);

/// SMTP command received by the mock server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCommand {
    /// HELO command with hostname
    Helo(String),
    /// MAIL command, with everything after `MAIL `
    MailFrom(String),
    /// RCPT command, with everything after `RCPT `
    RcptTo(String),
    /// DATA command
    Data,
    /// Message content (after DATA), without the terminating dot
    MessageContent(String),
    /// QUIT command
    Quit,
    /// Unknown/other command
    Other(String),
}

/// Reply configuration for SMTP commands
#[derive(Debug, Clone)]
pub struct SmtpResponse {
    pub code: u16,
    pub message: String,
}

impl SmtpResponse {
    fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        format!("{} {}\r\n", self.code, self.message).into_bytes()
    }
}

#[derive(Clone)]
struct MockServerConfig {
    greeting: SmtpResponse,
    helo_response: SmtpResponse,
    mail_from_response: SmtpResponse,
    rcpt_to_response: SmtpResponse,
    rejected_recipients: Vec<(String, SmtpResponse)>,
    data_response: SmtpResponse,
    data_end_response: SmtpResponse,
    quit_response: SmtpResponse,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            greeting: SmtpResponse::new(220, "Mock SMTP Server"),
            helo_response: SmtpResponse::new(250, "Hello"),
            mail_from_response: SmtpResponse::new(250, "OK"),
            rcpt_to_response: SmtpResponse::new(250, "OK"),
            rejected_recipients: Vec::new(),
            data_response: SmtpResponse::new(354, "Start mail input; end with <CRLF>.<CRLF>"),
            data_end_response: SmtpResponse::new(250, "OK: Message accepted"),
            quit_response: SmtpResponse::new(221, "Bye"),
        }
    }
}

impl MockServerConfig {
    fn rcpt_response(&self, argument: &str) -> &SmtpResponse {
        self.rejected_recipients
            .iter()
            .find(|(address, _)| argument.contains(&format!("<{address}>")))
            .map_or(&self.rcpt_to_response, |(_, response)| response)
    }
}

/// A finished connection and the commands received on it.
#[derive(Debug, Clone)]
pub struct Session {
    /// Order in which the connection was accepted
    pub index: usize,
    pub commands: Vec<SmtpCommand>,
}

impl Session {
    pub fn message(&self) -> Option<&str> {
        self.commands.iter().find_map(|command| match command {
            SmtpCommand::MessageContent(content) => Some(content.as_str()),
            _ => None,
        })
    }
}

/// Mock SMTP relay for testing
pub struct MockSmtpServer {
    addr: SocketAddr,
    sessions: Arc<RwLock<Vec<Session>>>,
    shutdown: Arc<AtomicBool>,
}

impl MockSmtpServer {
    #[must_use]
    pub fn builder() -> MockSmtpServerBuilder {
        MockSmtpServerBuilder::new()
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Finished sessions, in accept order
    pub async fn sessions(&self) -> Vec<Session> {
        let mut sessions = self.sessions.read().await.clone();
        sessions.sort_by_key(|session| session.index);
        sessions
    }

    /// Waits until at least `count` sessions have finished.
    ///
    /// # Panics
    ///
    /// Panics if they do not finish in time.
    pub async fn wait_for_sessions(&self, count: usize) -> Vec<Session> {
        let waited = timeout(WAIT_LIMIT, async {
            loop {
                if self.sessions.read().await.len() >= count {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        assert!(waited.is_ok(), "Timed out waiting for {count} sessions");
        self.sessions().await
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Handle a single client connection
    async fn handle_client(
        mut stream: TcpStream,
        config: Arc<MockServerConfig>,
        commands: &mut Vec<SmtpCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (reader, mut writer) = stream.split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        writer.write_all(&config.greeting.to_bytes()).await?;
        writer.flush().await?;

        loop {
            line.clear();

            let read_result = timeout(Duration::from_secs(10), reader.read_line(&mut line)).await;
            let Ok(bytes_read) = read_result else {
                return Ok(());
            };
            if bytes_read? == 0 {
                return Ok(());
            }

            let cmd_line = line.trim();
            tracing::debug!("Mock server received: {}", cmd_line);

            let (verb, argument) = cmd_line.split_once(' ').unwrap_or((cmd_line, ""));

            let (response, smtp_cmd) = match verb.to_uppercase().as_str() {
                "HELO" => (
                    config.helo_response.to_bytes(),
                    SmtpCommand::Helo(argument.to_string()),
                ),
                "MAIL" => (
                    config.mail_from_response.to_bytes(),
                    SmtpCommand::MailFrom(argument.to_string()),
                ),
                "RCPT" => (
                    config.rcpt_response(argument).to_bytes(),
                    SmtpCommand::RcptTo(argument.to_string()),
                ),
                "DATA" => (config.data_response.to_bytes(), SmtpCommand::Data),
                "QUIT" => {
                    commands.push(SmtpCommand::Quit);
                    writer.write_all(&config.quit_response.to_bytes()).await?;
                    writer.flush().await?;
                    return Ok(());
                }
                _ => (
                    SmtpResponse::new(500, "Unknown command").to_bytes(),
                    SmtpCommand::Other(cmd_line.to_string()),
                ),
            };

            commands.push(smtp_cmd.clone());
            writer.write_all(&response).await?;
            writer.flush().await?;

            if matches!(smtp_cmd, SmtpCommand::Data) && config.data_response.code == 354 {
                // Read message content until we see <CRLF>.<CRLF>
                let mut message_content = String::new();
                let mut data_line = String::new();

                loop {
                    data_line.clear();
                    if reader.read_line(&mut data_line).await? == 0 {
                        return Ok(());
                    }

                    if data_line.trim_end_matches(['\r', '\n']) == "." {
                        commands.push(SmtpCommand::MessageContent(message_content));
                        writer
                            .write_all(&config.data_end_response.to_bytes())
                            .await?;
                        writer.flush().await?;
                        break;
                    }

                    message_content.push_str(&data_line);
                }
            }
        }
    }
}

/// Builder for configuring a `MockSmtpServer`
pub struct MockSmtpServerBuilder {
    config: MockServerConfig,
}

impl MockSmtpServerBuilder {
    fn new() -> Self {
        Self {
            config: MockServerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_greeting(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.greeting = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_helo_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.helo_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_mail_from_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.mail_from_response = SmtpResponse::new(code, message);
        self
    }

    /// Reply to every RCPT TO not covered by [`Self::with_rejected_recipient`]
    #[must_use]
    pub fn with_rcpt_to_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.rcpt_to_response = SmtpResponse::new(code, message);
        self
    }

    /// Reply to RCPT TO for `address` only
    #[must_use]
    pub fn with_rejected_recipient(
        mut self,
        address: impl Into<String>,
        code: u16,
        message: impl Into<String>,
    ) -> Self {
        self.config
            .rejected_recipients
            .push((address.into(), SmtpResponse::new(code, message)));
        self
    }

    #[must_use]
    pub fn with_data_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_response = SmtpResponse::new(code, message);
        self
    }

    /// Set the response after message content (after `<CRLF>.<CRLF>`)
    #[must_use]
    pub fn with_data_end_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_end_response = SmtpResponse::new(code, message);
        self
    }

    /// Build and start the mock server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to a port
    pub async fn build(self) -> Result<MockSmtpServer, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let config = Arc::new(self.config);
        let sessions = Arc::new(RwLock::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let accepted = Arc::new(AtomicUsize::new(0));

        let sessions_clone = Arc::clone(&sessions);
        let shutdown_clone = Arc::clone(&shutdown);

        tokio::spawn(async move {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }

                // Accept connection with timeout to allow checking shutdown flag
                let accept_result = timeout(Duration::from_millis(100), listener.accept()).await;

                if let Ok(Ok((stream, _peer))) = accept_result {
                    let index = accepted.fetch_add(1, Ordering::Relaxed);
                    let config = Arc::clone(&config);
                    let sessions = Arc::clone(&sessions_clone);

                    tokio::spawn(async move {
                        let mut commands = Vec::new();
                        if let Err(e) =
                            MockSmtpServer::handle_client(stream, config, &mut commands).await
                        {
                            tracing::debug!("Mock server client error: {}", e);
                        }
                        sessions.write().await.push(Session { index, commands });
                    });
                }
            }
        });

        Ok(MockSmtpServer {
            addr,
            sessions,
            shutdown,
        })
    }
}
