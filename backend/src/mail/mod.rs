//! Email delivery of rendered orders.
//!
//! A thin layer over [lettre](https://lettre.rs): build an [`Email`], hand it to
//! a [`Mailer`]. The SMTP implementation probes the relay before every send and
//! bounds each network phase with a timeout. Failures can be turned into short
//! operator hints with a [`HintClassifier`].
//!
//! ```ignore
//! let mailer = SmtpMailer::from_config(MailerConfig::from(&app_config))?;
//! let email = Email::builder()
//!     .to("shop@example.com")
//!     .subject("New order from Ana - Ring")
//!     .html("<h2>New Order from Ana</h2>")
//!     .build()?;
//! mailer.send(&email).await?;
//! ```

pub mod hint;
mod mailer;
mod message;

pub use hint::{HintClassifier, HintRule};
pub use mailer::{Mailer, MailerConfig, SmtpMailer, TlsMode};
pub use message::{Email, EmailBuilder};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("GMAIL credentials not configured")]
    MissingCredentials,

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("Connection timeout while {0}")]
    Timeout(&'static str),

    #[error("SMTP relay rejected the connection probe")]
    ProbeRejected,

    #[error("{0}")]
    Smtp(String),
}
