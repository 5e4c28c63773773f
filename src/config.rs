use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub json_payload_limit: usize,
    pub gemini: GeminiConfig,
    pub generation_timeout: Duration,
    pub max_concurrent_generations: usize,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

impl AppConfig {
    /// Reads configuration from the process environment. Fails when the API
    /// key is missing so the server never starts without credentials.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("GOOGLE_API_KEY is required but not set"))?;

        let max_concurrent_generations: usize =
            parse_or(&lookup, "MAX_CONCURRENT_GENERATIONS", 16)?;
        if max_concurrent_generations == 0 {
            return Err(anyhow!("MAX_CONCURRENT_GENERATIONS must be at least 1"));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8000)?,
            json_payload_limit: parse_or(&lookup, "JSON_PAYLOAD_LIMIT", 256 * 1024)?,
            gemini: GeminiConfig {
                api_key,
                api_base: lookup("GEMINI_API_BASE")
                    .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
                model: lookup("GEMINI_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                temperature: parse_optional(&lookup, "TEMPERATURE")?,
                top_p: parse_optional(&lookup, "TOP_P")?,
            },
            generation_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GENERATION_TIMEOUT_SECS",
                120,
            )?),
            max_concurrent_generations,
        })
    }
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{} has an invalid value: {:?}", key, raw))
        })
        .transpose()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));

        assert!(load(&[("GOOGLE_API_KEY", "   ")]).is_err());
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("GOOGLE_API_KEY", "secret")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini.api_base, DEFAULT_GEMINI_API_BASE);
        assert_eq!(config.gemini.temperature, None);
        assert_eq!(config.generation_timeout, Duration::from_secs(120));
        assert_eq!(config.max_concurrent_generations, 16);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("GOOGLE_API_KEY", "secret"),
            ("PORT", "9001"),
            ("TEMPERATURE", "0.2"),
            ("TOP_P", "0.95"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GENERATION_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.port, 9001);
        assert_eq!(config.gemini.temperature, Some(0.2));
        assert_eq!(config.gemini.top_p, Some(0.95));
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.generation_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(load(&[("GOOGLE_API_KEY", "secret"), ("PORT", "eighty")]).is_err());
        assert!(load(&[
            ("GOOGLE_API_KEY", "secret"),
            ("MAX_CONCURRENT_GENERATIONS", "0")
        ])
        .is_err());
    }
}
