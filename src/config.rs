use std::time::Duration;

pub const GEMINI_PLACEHOLDER_KEY: &str = "your_gemini_api_key_here";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Runtime configuration, read from the environment (and `.env` via dotenvy in `main`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub gemini: GeminiConfig,
    pub token_ttl: Duration,
    pub login_max_attempts: usize,
    pub login_window: Duration,
    pub audit_retention_days: i64,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// The usable API key, if one is set and is not the sample placeholder.
    pub fn usable_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != GEMINI_PLACEHOLDER_KEY)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "DATABASE_URL must be set".to_string())?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());

        let api_key = lookup("GEMINI_API_KEY");
        match api_key.as_deref() {
            None => log::warn!("No GEMINI_API_KEY set - AI analysis requests will be rejected"),
            Some(GEMINI_PLACEHOLDER_KEY) => {
                log::warn!("GEMINI_API_KEY is still the placeholder value - AI analysis disabled")
            }
            Some(_) => {}
        }

        let defaults = GeminiConfig::default();
        let gemini = GeminiConfig {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: lookup("GEMINI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(parse_or(&lookup, "AI_TIMEOUT_SECS", 60)?),
        };

        let ttl_hours: u64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 168)?;
        let token_ttl = ttl_hours
            .checked_mul(3600)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("TOKEN_TTL_HOURS is too large, got '{ttl_hours}'"))?;

        Ok(Self {
            database_url,
            bind_addr,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 8)?,
            gemini,
            token_ttl,
            login_max_attempts: parse_or(&lookup, "LOGIN_MAX_ATTEMPTS", 5)?,
            login_window: Duration::from_secs(parse_or(&lookup, "LOGIN_WINDOW_SECS", 900)?),
            audit_retention_days: parse_or(&lookup, "AUDIT_RETENTION_DAYS", 90)?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{key} must be a number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/ideas")]))
            .expect("config");
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.max_connections, 8);
        assert_eq!(cfg.gemini.model, "gemini-pro");
        assert_eq!(cfg.token_ttl, Duration::from_secs(168 * 3600));
        assert!(cfg.gemini.usable_key().is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(AppConfig::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn bad_number_is_reported_with_its_key() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/ideas"),
            ("AI_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.contains("AI_TIMEOUT_SECS"));
    }

    #[test]
    fn oversized_token_ttl_is_an_error() {
        let huge = u64::MAX.to_string();
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/ideas"),
            ("TOKEN_TTL_HOURS", huge.as_str()),
        ]))
        .unwrap_err();
        assert!(err.contains("TOKEN_TTL_HOURS"));
    }

    #[test]
    fn placeholder_key_is_not_usable() {
        let gemini = GeminiConfig {
            api_key: Some(GEMINI_PLACEHOLDER_KEY.to_string()),
            ..GeminiConfig::default()
        };
        assert!(gemini.usable_key().is_none());

        let gemini = GeminiConfig {
            api_key: Some("abc123".to_string()),
            ..GeminiConfig::default()
        };
        assert_eq!(gemini.usable_key(), Some("abc123"));
    }
}
