//! Storefront order backend: validates an order posted as JSON, renders it as
//! HTML and relays it by SMTP to the shop owner.

pub mod config;
pub mod error;
pub mod mail;
pub mod order;
pub mod render;
pub mod routes;
pub mod serve;
pub mod validate;

pub use config::{AppConfig, EnvConfig};
pub use routes::{router, AppContext};
pub use serve::serve;
