//! SMTP client used by the delivery engine.
//!
//! Plain TCP, `HELO` instead of `EHLO`, one envelope
//! recipient, no authentication and no STARTTLS.
//!
//! ```no_run
//! use courier_smtp::client::{MessageBuilder, SmtpClient};
//!
//! # async fn example() -> Result<(), courier_smtp::ClientError> {
//! let mut client = SmtpClient::connect("mail.example.com", 25).await?;
//! client.read_greeting().await?;
//! client.helo("localhost.com").await?;
//! client.mail_from("a@example.org").await?;
//! client.rcpt_to("b@example.com").await?;
//! client.data().await?;
//! let message = MessageBuilder::new().from("a@example.org").to("b@example.com").body("Hi").build();
//! client.send_data(&message).await?;
//! client.quit().await?;
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod message;
mod response;
mod smtp_client;

pub use error::{ClientError, Result};
pub use message::MessageBuilder;
pub use response::{Response, ResponseLine};
pub use smtp_client::SmtpClient;
