//! Configuration management for the scanner

use crate::error::{AppError, Result};
use chrono_tz::Tz;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub endpoint: String,
    /// `None` means the request waits for the service indefinitely.
    pub timeout_seconds: Option<u64>,
    /// Zone in which the service reports `fecha` values.
    pub invoice_timezone: Tz,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub log_level: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            endpoint: "/api/invoices/extract".to_string(),
            timeout_seconds: None,
            invoice_timezone: chrono_tz::America::Panama,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = ExtractionConfig::default();

        let timeout_seconds = match env::var("EXTRACTION_TIMEOUT_SECONDS") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_var("EXTRACTION_TIMEOUT_SECONDS", &raw)?),
            _ => None,
        };

        let invoice_timezone = match env::var("INVOICE_TIMEZONE") {
            Ok(raw) => Tz::from_str(raw.trim()).map_err(|e| {
                AppError::configuration(format!("INVOICE_TIMEZONE '{}' is not a valid zone: {}", raw, e))
            })?,
            Err(_) => defaults.invoice_timezone,
        };

        Ok(Config {
            extraction: ExtractionConfig {
                base_url: env::var("EXTRACTION_SERVICE_URL").unwrap_or(defaults.base_url),
                endpoint: env::var("EXTRACTION_ENDPOINT").unwrap_or(defaults.endpoint),
                timeout_seconds,
                invoice_timezone,
            },
            app: AppConfig {
                environment: env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "info".to_string()),
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::configuration(format!("{} has invalid value '{}': {}", name, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.endpoint, "/api/invoices/extract");
        assert!(config.timeout_seconds.is_none());
        assert_eq!(config.invoice_timezone, chrono_tz::America::Panama);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        assert_eq!(parse_var::<u64>("X", " 15 ").unwrap(), 15);
        let err = parse_var::<u64>("EXTRACTION_TIMEOUT_SECONDS", "diez").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
