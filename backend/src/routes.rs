//! HTTP routes: status, order submission, and the static storefront bundle.

use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::mail::{Email, HintClassifier, MailError, Mailer, MailerConfig, SmtpMailer};
use crate::order::OrderSubmission;
use crate::{render, validate};

/// Read-only state shared by every request.
#[derive(Clone, FromRef)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub hints: Arc<HintClassifier>,
}

impl AppContext {
    /// Builds the SMTP mailer and the built-in hint rules from `config`.
    pub fn new(config: AppConfig) -> std::result::Result<Self, MailError> {
        let mailer = SmtpMailer::from_config(MailerConfig::from(&config))?;
        Ok(Self::with_mailer(config, mailer))
    }

    pub fn with_mailer(config: AppConfig, mailer: impl Mailer) -> Self {
        Self {
            config: Arc::new(config),
            mailer: Arc::new(mailer),
            hints: Arc::new(HintClassifier::builtin()),
        }
    }

    fn delivery_error(&self, err: MailError) -> Error {
        let details = err.to_string();
        let hint = self.hints.classify(&details).map(str::to_string);
        Error::Delivery { details, hint }
    }
}

pub fn router(ctx: AppContext) -> Router {
    let api = Router::new()
        .route("/api/status", get(status))
        .route("/send-order", post(send_order));

    let routes = match ctx.config.static_root() {
        Some(root) => {
            tracing::info!(root = %root.display(), "serving static bundle");
            let entry = ServeFile::new(root.join("index.html"));
            api.fallback_service(ServeDir::new(root).fallback(entry))
        }
        None => api.route("/", get(status)).fallback(not_found),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}

async fn status(State(config): State<Arc<AppConfig>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": format!("{} backend running", config.service_name),
    }))
}

/// A missing or malformed body is treated as an empty order.
async fn send_order(
    State(ctx): State<AppContext>,
    body: Option<Json<OrderSubmission>>,
) -> Result<Json<Value>> {
    let order = body.map(|Json(order)| order).unwrap_or_default();
    validate::check_required(&order)?;

    let recipient = ctx.config.recipient().ok_or(Error::NotConfigured)?;

    let email = Email::builder()
        .to(recipient)
        .subject(render::subject(&order))
        .html(render::order_html(&order))
        .build()
        .map_err(|e| ctx.delivery_error(e))?;

    ctx.mailer
        .send(&email)
        .await
        .map_err(|e| ctx.delivery_error(e))?;

    tracing::info!(recipient, subject = %email.subject, "order sent");
    Ok(Json(json!({"ok": true, "message": "Order sent"})))
}

async fn not_found() -> Error {
    Error::NotFound
}
