use std::env;

use chrono_tz::Tz;

use crate::domain::entities::TimeRange;
use crate::domain::services::{DEFAULT_BUSINESS_HOURS, DEFAULT_SLOT_INTERVAL_MINUTES};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Zone that defines "today" for the regeneration worker
    pub business_timezone: Tz,
    pub business_hours: TimeRange,
    pub slot_interval_minutes: u32,
    pub regeneration_enabled: bool,
    pub regeneration_check_interval_seconds: u64,
    pub smtp: Option<SmtpSettings>,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
}

#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://fieldbook.db?mode=rwc".to_string());

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let business_timezone = match lookup("BUSINESS_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone(name))?,
            None => Tz::UTC,
        };

        let business_hours = match (lookup("BUSINESS_HOURS_START"), lookup("BUSINESS_HOURS_END")) {
            (None, None) => DEFAULT_BUSINESS_HOURS,
            (start, end) => {
                let start = start.unwrap_or_else(|| "09:00".to_string());
                let end = end.unwrap_or_else(|| "17:00".to_string());
                // Slot end times are clock times, so the day must close before midnight
                TimeRange::from_bounds(&start, &end)
                    .filter(|hours| hours.end < 24 * 60)
                    .ok_or_else(|| ConfigError::InvalidBusinessHours(format!("{} - {}", start, end)))?
            }
        };

        let slot_interval_minutes = match lookup("SLOT_INTERVAL_MINUTES") {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or(ConfigError::InvalidSlotInterval(value))?,
            None => DEFAULT_SLOT_INTERVAL_MINUTES,
        };

        let regeneration_enabled = lookup("REGENERATION_ENABLED")
            .map(|value| !matches!(value.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(true);

        let regeneration_check_interval_seconds = lookup("REGENERATION_CHECK_INTERVAL_SECONDS")
            .and_then(|value| value.parse().ok())
            .filter(|seconds| *seconds > 0)
            .unwrap_or(300);

        let smtp = match lookup("SMTP_HOST") {
            Some(host) => Some(SmtpSettings {
                host,
                port: lookup("SMTP_PORT")
                    .unwrap_or_else(|| "587".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidPort)?,
                username: lookup("SMTP_USERNAME"),
                password: lookup("SMTP_PASSWORD"),
                from: lookup("SMTP_FROM").ok_or(ConfigError::MissingSmtpFrom)?,
            }),
            None => None,
        };

        let otel_exporter_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT");

        let service_name = lookup("SERVICE_NAME").unwrap_or_else(|| "fieldbook".to_string());

        let metrics_port = lookup("METRICS_PORT")
            .unwrap_or_else(|| "9000".to_string())
            .parse()
            .unwrap_or(9000);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            business_timezone,
            business_hours,
            slot_interval_minutes,
            regeneration_enabled,
            regeneration_check_interval_seconds,
            smtp,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid business hours: {0}")]
    InvalidBusinessHours(String),

    #[error("Invalid slot interval: {0}")]
    InvalidSlotInterval(String),

    #[error("SMTP_FROM must be set when SMTP_HOST is configured")]
    MissingSmtpFrom,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.server_address(), "127.0.0.1:3000");
        assert_eq!(config.business_timezone, Tz::UTC);
        assert_eq!(config.business_hours, DEFAULT_BUSINESS_HOURS);
        assert_eq!(config.slot_interval_minutes, 30);
        assert!(config.regeneration_enabled);
        assert_eq!(config.regeneration_check_interval_seconds, 300);
        assert!(config.smtp.is_none());
        assert_eq!(config.service_name, "fieldbook");
    }

    #[test]
    fn test_business_settings() {
        let config = config_from(&[
            ("BUSINESS_TIMEZONE", "America/Chicago"),
            ("BUSINESS_HOURS_START", "8:00 AM"),
            ("BUSINESS_HOURS_END", "18:30"),
            ("SLOT_INTERVAL_MINUTES", "15"),
            ("REGENERATION_ENABLED", "false"),
        ])
        .unwrap();

        assert_eq!(config.business_timezone, chrono_tz::America::Chicago);
        assert_eq!(config.business_hours, TimeRange::new(8 * 60, 18 * 60 + 30));
        assert_eq!(config.slot_interval_minutes, 15);
        assert!(!config.regeneration_enabled);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("SERVER_PORT", "http")]),
            Err(ConfigError::InvalidPort)
        ));
        assert!(matches!(
            config_from(&[("BUSINESS_TIMEZONE", "Mars/Olympus")]),
            Err(ConfigError::InvalidTimezone(_))
        ));
        assert!(matches!(
            config_from(&[("BUSINESS_HOURS_START", "18:00"), ("BUSINESS_HOURS_END", "09:00")]),
            Err(ConfigError::InvalidBusinessHours(_))
        ));
        assert!(matches!(
            config_from(&[("BUSINESS_HOURS_START", "20:00"), ("BUSINESS_HOURS_END", "24:00")]),
            Err(ConfigError::InvalidBusinessHours(_))
        ));
        assert!(matches!(
            config_from(&[("SLOT_INTERVAL_MINUTES", "0")]),
            Err(ConfigError::InvalidSlotInterval(_))
        ));
        assert!(matches!(
            config_from(&[("SMTP_HOST", "smtp.example.com")]),
            Err(ConfigError::MissingSmtpFrom)
        ));
    }
}
