pub mod domain;
pub mod llm;
pub mod relay;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    use crate::relay::classify::ChartPolicy;

    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
    pub const DEFAULT_ANALYZE_MAX_TOKENS: u32 = 2500;
    pub const DEFAULT_ADVICE_MAX_TOKENS: u32 = 3000;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CorsOrigins {
        Any,
        List(Vec<String>),
    }

    impl CorsOrigins {
        pub fn parse(raw: &str) -> Self {
            let raw = raw.trim();
            if raw.is_empty() || raw == "*" {
                return Self::Any;
            }
            Self::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub port: u16,
        pub openai_api_key: Option<String>,
        pub openai_base_url: String,
        pub openai_model: String,
        pub openai_timeout: Duration,
        pub analyze_max_tokens: u32,
        pub advice_max_tokens: u32,
        pub cors_origins: CorsOrigins,
        pub chart_policy: ChartPolicy,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                port: DEFAULT_PORT,
                openai_api_key: None,
                openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                openai_model: DEFAULT_OPENAI_MODEL.to_string(),
                openai_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                analyze_max_tokens: DEFAULT_ANALYZE_MAX_TOKENS,
                advice_max_tokens: DEFAULT_ADVICE_MAX_TOKENS,
                cors_origins: CorsOrigins::Any,
                chart_policy: ChartPolicy::default(),
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from an arbitrary key lookup. Unset keys fall back to defaults;
        /// set but unparsable numeric keys are an error.
        pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let defaults = Self::default();

            let port = parse_or(&lookup, "PORT", defaults.port)?;
            let timeout_secs = parse_or(&lookup, "OPENAI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
            let analyze_max_tokens =
                parse_or(&lookup, "ANALYZE_MAX_TOKENS", defaults.analyze_max_tokens)?;
            let advice_max_tokens =
                parse_or(&lookup, "ADVICE_MAX_TOKENS", defaults.advice_max_tokens)?;

            let chart_policy = match lookup("CHART_POLICY") {
                Some(raw) => raw
                    .parse::<ChartPolicy>()
                    .with_context(|| format!("invalid CHART_POLICY: {raw}"))?,
                None => defaults.chart_policy,
            };

            Ok(Self {
                port,
                openai_api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
                openai_base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
                openai_model: lookup("OPENAI_MODEL").unwrap_or(defaults.openai_model),
                openai_timeout: Duration::from_secs(timeout_secs),
                analyze_max_tokens,
                advice_max_tokens,
                cors_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|raw| CorsOrigins::parse(&raw))
                    .unwrap_or(defaults.cors_origins),
                chart_policy,
                sentry_dsn: lookup("SENTRY_DSN"),
            })
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }
    }

    fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match lookup(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("invalid {key}: {raw}")),
            None => Ok(default),
        }
    }

}
