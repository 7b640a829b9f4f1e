//! Mailer trait and SMTP implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use super::{Email, MailError};

/// Async email sending trait.
///
/// Implement this trait to provide alternative email backends, or a recording
/// mailer in tests.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send an email. One attempt, no retries.
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS (port 587).
    #[default]
    Starttls,
    /// TLS from the first byte (port 465).
    Tls,
    /// No encryption. Only for local test relays.
    None,
}

/// Configuration for [`SmtpMailer`].
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Default sender address.
    pub from: Option<String>,
    pub tls: TlsMode,
    /// Skip certificate verification. Opt-in only.
    pub accept_invalid_certs: bool,
    pub connection_timeout: Duration,
    pub greeting_timeout: Duration,
    pub socket_timeout: Duration,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: None,
            password: None,
            from: None,
            tls: TlsMode::Starttls,
            accept_invalid_certs: false,
            connection_timeout: Duration::from_secs(30),
            greeting_timeout: Duration::from_secs(30),
            socket_timeout: Duration::from_secs(30),
        }
    }
}

/// SMTP-based mailer using lettre.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
    authenticated: bool,
    probe_timeout: Duration,
    send_timeout: Duration,
}

impl SmtpMailer {
    /// Create a mailer from explicit configuration.
    ///
    /// Missing credentials are not an error here: the mailer is still built,
    /// and every [`Mailer::send`] fails with [`MailError::MissingCredentials`]
    /// before touching the network.
    pub fn from_config(config: MailerConfig) -> Result<Self, MailError> {
        let from = config
            .from
            .as_deref()
            .map(|from| {
                from.parse::<Mailbox>()
                    .map_err(|_| MailError::InvalidAddress(from.to_string()))
            })
            .transpose()?;

        let builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .timeout(Some(config.socket_timeout));

        let mut builder = match config.tls {
            TlsMode::None => builder,
            TlsMode::Starttls => builder.tls(Tls::Required(tls_parameters(&config)?)),
            TlsMode::Tls => builder.tls(Tls::Wrapper(tls_parameters(&config)?)),
        };

        let authenticated = match (config.username, config.password) {
            (Some(username), Some(password)) => {
                builder = builder.credentials(Credentials::new(username, password));
                true
            }
            _ => false,
        };

        // The probe covers connect, greeting, EHLO/STARTTLS and AUTH.
        let probe_timeout = config.connection_timeout + config.greeting_timeout;
        let send_timeout = probe_timeout + config.socket_timeout;

        Ok(Self {
            transport: Arc::new(builder.build()),
            from,
            authenticated,
            probe_timeout,
            send_timeout,
        })
    }

    fn build_message(&self, email: &Email) -> Result<Message, MailError> {
        let from = self
            .from
            .clone()
            .ok_or_else(|| MailError::MissingConfig("sender address".into()))?;

        let mut builder = Message::builder().from(from);

        for to in &email.to {
            let mailbox: Mailbox = to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.clone()))?;
            builder = builder.to(mailbox);
        }

        builder
            .subject(&email.subject)
            .singlepart(SinglePart::html(email.html.clone()))
            .map_err(|e| MailError::Build(e.to_string()))
    }

    /// Connects, greets and authenticates without sending anything.
    async fn probe(&self) -> Result<(), MailError> {
        let reachable = tokio::time::timeout(self.probe_timeout, self.transport.test_connection())
            .await
            .map_err(|_| MailError::Timeout("connecting to the relay"))?
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        if reachable {
            Ok(())
        } else {
            Err(MailError::ProbeRejected)
        }
    }
}

fn tls_parameters(config: &MailerConfig) -> Result<TlsParameters, MailError> {
    if config.accept_invalid_certs {
        tracing::warn!(host = %config.host, "TLS certificate verification disabled for SMTP relay");
    }

    TlsParameters::builder(config.host.clone())
        .dangerous_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| MailError::Smtp(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if !self.authenticated {
            return Err(MailError::MissingCredentials);
        }

        let message = self.build_message(email)?;

        self.probe().await?;
        tracing::debug!("SMTP relay probe succeeded");

        tokio::time::timeout(self.send_timeout, self.transport.send(message))
            .await
            .map_err(|_| MailError::Timeout("sending the message"))?
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    use crate::mail::hint::{HintClassifier, AUTH_HINT};

    type RelayLog = Arc<Mutex<Vec<String>>>;

    /// Minimal line-based SMTP relay. Logs `CONN n` per connection and the
    /// verb of every command, plus `DATA-END` when a message body completes.
    async fn fake_relay(reject_auth: bool) -> (u16, RelayLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let log = RelayLog::default();

        let relay_log = log.clone();
        tokio::spawn(async move {
            let mut connections = 0;
            while let Ok((socket, _)) = listener.accept().await {
                connections += 1;
                relay_log.lock().unwrap().push(format!("CONN {connections}"));
                tokio::spawn(relay_session(socket, reject_auth, relay_log.clone()));
            }
        });

        (port, log)
    }

    async fn relay_session(socket: TcpStream, reject_auth: bool, log: RelayLog) {
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();
        if write.write_all(b"220 relay.test ESMTP\r\n").await.is_err() {
            return;
        }

        let mut in_data = false;
        while let Ok(Some(line)) = lines.next_line().await {
            if in_data {
                if line == "." {
                    in_data = false;
                    log.lock().unwrap().push("DATA-END".to_string());
                    if write.write_all(b"250 2.0.0 queued\r\n").await.is_err() {
                        break;
                    }
                }
                continue;
            }

            let verb = line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
            log.lock().unwrap().push(verb.clone());

            let reply: &[u8] = match verb.as_str() {
                "EHLO" | "HELO" => b"250-relay.test\r\n250 AUTH PLAIN LOGIN\r\n",
                "AUTH" if reject_auth => b"535 5.7.8 Username and Password not accepted\r\n",
                "AUTH" => b"235 2.7.0 Accepted\r\n",
                "DATA" => {
                    in_data = true;
                    b"354 End data with <CR><LF>.<CR><LF>\r\n"
                }
                "QUIT" => {
                    let _ = write.write_all(b"221 2.0.0 Bye\r\n").await;
                    break;
                }
                _ => b"250 2.0.0 OK\r\n",
            };
            if write.write_all(reply).await.is_err() {
                break;
            }
        }
    }

    fn position(log: &[String], entry: &str) -> usize {
        log.iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("{entry} missing from relay log {log:?}"))
    }

    fn plain_relay(port: u16) -> MailerConfig {
        credentials(MailerConfig {
            host: "127.0.0.1".into(),
            port,
            tls: TlsMode::None,
            ..Default::default()
        })
    }

    fn email() -> Email {
        Email::builder()
            .to("owner@example.com")
            .subject("New order from Ana - Ring")
            .html("<h2>New Order from Ana</h2>")
            .build()
            .unwrap()
    }

    fn credentials(config: MailerConfig) -> MailerConfig {
        MailerConfig {
            username: Some("shop@example.com".into()),
            password: Some("app-password".into()),
            from: Some("shop@example.com".into()),
            ..config
        }
    }

    #[tokio::test]
    async fn send_without_credentials_fails_before_connecting() {
        // Nothing listens here; reaching the network would surface a connection error.
        let mailer = SmtpMailer::from_config(MailerConfig {
            host: "127.0.0.1".into(),
            port: 1,
            ..Default::default()
        })
        .unwrap();

        let err = mailer.send(&email()).await.unwrap_err();
        assert!(matches!(err, MailError::MissingCredentials));
        assert_eq!(err.to_string(), "GMAIL credentials not configured");
    }

    #[tokio::test]
    async fn invalid_default_sender_is_rejected() {
        let result = SmtpMailer::from_config(MailerConfig {
            from: Some("not an address".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(MailError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn invalid_recipient_fails_before_connecting() {
        let mailer = SmtpMailer::from_config(credentials(MailerConfig {
            host: "127.0.0.1".into(),
            port: 1,
            ..Default::default()
        }))
        .unwrap();

        let email = Email {
            to: vec!["nope".into()],
            ..email()
        };
        let err = mailer.send(&email).await.unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress(addr) if addr == "nope"));
    }

    #[tokio::test]
    async fn silent_relay_times_out() {
        // Accepts TCP connections but never sends the SMTP greeting.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mailer = SmtpMailer::from_config(credentials(MailerConfig {
            host: "127.0.0.1".into(),
            port,
            tls: TlsMode::None,
            connection_timeout: Duration::from_millis(200),
            greeting_timeout: Duration::from_millis(200),
            socket_timeout: Duration::from_secs(30),
            ..Default::default()
        }))
        .unwrap();

        let err = mailer.send(&email()).await.unwrap_err();
        assert!(matches!(err, MailError::Timeout(_)));
        assert!(err.to_string().contains("timeout"));

        server.abort();
    }

    #[tokio::test]
    async fn relay_connection_is_checked_before_the_message_is_sent() {
        let (port, log) = fake_relay(false).await;
        let mailer = SmtpMailer::from_config(plain_relay(port)).unwrap();

        mailer.send(&email()).await.unwrap();

        let log = log.lock().unwrap().clone();
        let auth = position(&log, "AUTH");
        let noop = position(&log, "NOOP");
        let mail_from = position(&log, "MAIL");

        // Login and the liveness check both finish before the envelope starts.
        assert_eq!(log.first().map(String::as_str), Some("CONN 1"), "{log:?}");
        assert!(auth < noop, "{log:?}");
        assert!(noop < mail_from, "{log:?}");
        assert!(position(&log, "RCPT") > mail_from, "{log:?}");
        assert!(position(&log, "DATA-END") > mail_from, "{log:?}");
    }

    #[tokio::test]
    async fn rejected_login_is_classified_as_auth_failure() {
        let (port, log) = fake_relay(true).await;
        let mailer = SmtpMailer::from_config(plain_relay(port)).unwrap();

        let err = mailer.send(&email()).await.unwrap_err();

        assert!(matches!(err, MailError::Smtp(_)), "{err:?}");
        assert!(err.to_string().contains("535"), "{err}");
        assert_eq!(
            HintClassifier::builtin().classify(&err.to_string()),
            Some(AUTH_HINT)
        );

        let log = log.lock().unwrap().clone();
        assert!(!log.iter().any(|e| e == "MAIL"), "{log:?}");
    }
}
