//! Operator hints for failed deliveries.
//!
//! Relays report failures as free text, so classification is a best-effort
//! regex match over the error message. Rules are tried in order and the first
//! match wins. Nothing here is a contract with the relay.

use regex::Regex;

pub const TIMEOUT_HINT: &str = "Connection to the SMTP relay timed out. Outbound SMTP ports are likely \
    blocked by the host, or there is a network issue.";

pub const AUTH_HINT: &str = "SMTP authentication failed. Check GMAIL_USER and GMAIL_APP_PASSWORD; \
    Gmail requires an App Password when 2-Step Verification is enabled.";

pub const CERT_HINT: &str = "TLS certificate verification failed. Check the relay host, or set \
    SMTP_ACCEPT_INVALID_CERTS=true only if you trust the relay.";

/// A single pattern and the hint reported when it matches.
#[derive(Debug, Clone)]
pub struct HintRule {
    pattern: Regex,
    hint: String,
}

impl HintRule {
    /// Fails if `pattern` is not a valid regex.
    pub fn new(pattern: &str, hint: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            hint: hint.into(),
        })
    }

    pub fn matches(&self, message: &str) -> bool {
        self.pattern.is_match(message)
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }
}

#[derive(Debug, Clone, Default)]
pub struct HintClassifier {
    rules: Vec<HintRule>,
}

impl HintClassifier {
    /// Timeout, authentication and certificate rules, in that order.
    pub fn builtin() -> Self {
        let rules = [
            (r"(?i)time[sd]?\s*out|timeout|etimedout", TIMEOUT_HINT),
            (
                r"(?i)invalid login|auth(entication)?\s*(failed|unsuccessful|error)|username and password not accepted|badcredentials|\b535\b",
                AUTH_HINT,
            ),
            (
                r"(?i)certificate|self[- ]signed|unable to verify|unknownissuer",
                CERT_HINT,
            ),
        ];

        Self {
            rules: rules
                .into_iter()
                .map(|(pattern, hint)| HintRule::new(pattern, hint).expect("builtin hint rule"))
                .collect(),
        }
    }

    /// Appends a rule. It is consulted after all existing rules.
    pub fn with_rule(mut self, rule: HintRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn classify(&self, message: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(message))
            .map(HintRule::hint)
    }
}
