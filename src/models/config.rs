//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::domain::record::DEFAULT_DATE_FORMAT;

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_items_per_page() -> usize {
    20
}

#[derive(Clone, Debug, Deserialize)]
/// Settings shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    pub secret: String,
    /// Sign-in page unauthenticated visitors are sent to.
    pub auth_service_url: String,
    /// `strftime` pattern of dates in tables.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
}
