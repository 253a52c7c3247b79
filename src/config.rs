//! Runtime configuration, read from the environment (and an optional `.env`).

use crate::domain::category::FlaggedMonth;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_SITE_URL: &str = "https://clay7614.github.io/property_info/";
pub const DEFAULT_SENDER_NAME: &str = "SUUMO Tracker";

/// Mail settings; present only when an API key is configured.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
    pub recipient: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub history_file: PathBuf,
    pub database_path: PathBuf,
    pub schema_path: String,
    pub flagged_month: FlaggedMonth,
    pub bind_addr: SocketAddr,
    pub site_url: String,
    pub force_send: bool,
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = PathBuf::from(get("DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let history_file = get("HISTORY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("property_history.json"));
        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("tracker.sqlite3"));

        let flagged_month = match get("FLAGGED_MONTH") {
            Some(raw) => raw.parse().map_err(|e| format!("FLAGGED_MONTH: {e}"))?,
            None => FlaggedMonth::default(),
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8000".to_string())
            .parse()
            .map_err(|e| format!("BIND_ADDR: {e}"))?;

        let force_send = get("FORCE_SEND")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let mail = match (get("BREVO_API_KEY"), get("NOTIFICATION_EMAIL")) {
            (Some(api_key), Some(recipient)) => Some(MailConfig {
                from_email: get("FROM_EMAIL").unwrap_or_else(|| recipient.clone()),
                from_name: get("FROM_NAME").unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
                api_key,
                recipient,
            }),
            _ => None,
        };

        Ok(Self {
            data_dir,
            history_file,
            database_path,
            schema_path: get("SCHEMA_PATH").unwrap_or_else(|| "sql/schema.sql".to_string()),
            flagged_month,
            bind_addr,
            site_url: get("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            force_send,
            mail,
        })
    }
}
