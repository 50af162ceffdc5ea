use regex::Regex;
use std::sync::OnceLock;

/// Accepted `DATABASE_URL` schemes. `memory://` selects the process-local store.
const POSTGRES_SCHEMES: [&str; 2] = ["postgresql://", "postgres://"];
const MEMORY_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub host: String,
    pub port: u16,
    pub strict_email_validation: bool,
    pub db_max_connections: u32,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_name: None,
            host: "0.0.0.0".to_string(),
            port: 8000,
            strict_email_validation: true,
            db_max_connections: 10,
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match config.database_url {
            Some(ref url) => tracing::debug!(
                "Database URL: {}...",
                url.chars().take(20).collect::<String>()
            ),
            None => tracing::warn!("DATABASE_URL not set, storage will be unavailable"),
        }
        match config.database_name {
            Some(ref name) => tracing::debug!("Database name: {}", name),
            None => tracing::warn!("DATABASE_NAME not set, storage will be unavailable"),
        }
        tracing::debug!("Server address: {}:{}", config.host, config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            database_url: non_empty("DATABASE_URL")
                .or_else(|| non_empty("DB_URL"))
                .map(|url| url.trim().to_string())
                .filter(|url| {
                    let supported = is_supported_url(url);
                    if !supported {
                        tracing::error!(
                            "DATABASE_URL must start with postgresql://, postgres:// or memory://; \
                             storage disabled"
                        );
                    }
                    supported
                }),
            database_name: non_empty("DATABASE_NAME")
                .map(|name| name.trim().to_string())
                .filter(|name| {
                    let valid = is_valid_store_name(name);
                    if !valid {
                        tracing::error!(
                            "DATABASE_NAME must be a plain identifier (letters, digits, underscore); \
                             storage disabled"
                        );
                    }
                    valid
                }),
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: non_empty("PORT")
                .map(|v| v.trim().parse::<u16>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?
                .map(|port| {
                    if port == 0 {
                        anyhow::bail!("PORT must be a valid number between 1-65535");
                    }
                    Ok(port)
                })
                .transpose()?
                .unwrap_or(defaults.port),
            strict_email_validation: non_empty("STRICT_EMAIL_VALIDATION")
                .map(|v| parse_bool(&v))
                .transpose()
                .map_err(|_| anyhow::anyhow!("STRICT_EMAIL_VALIDATION must be true or false"))?
                .unwrap_or(defaults.strict_email_validation),
            db_max_connections: parse_positive(
                non_empty("DB_MAX_CONNECTIONS"),
                "DB_MAX_CONNECTIONS",
            )?
            .unwrap_or(defaults.db_max_connections),
            request_timeout_secs: parse_positive(
                non_empty("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
            )?
            .unwrap_or(defaults.request_timeout_secs),
            max_body_bytes: parse_positive(non_empty("MAX_BODY_BYTES"), "MAX_BODY_BYTES")?
                .unwrap_or(defaults.max_body_bytes),
        };

        Ok(config)
    }

    /// Storage is only usable when both the connection string and the store name are present.
    pub fn storage_configured(&self) -> bool {
        self.database_url.is_some() && self.database_name.is_some()
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url
            .as_deref()
            .is_some_and(|url| url.starts_with(MEMORY_SCHEME))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_supported_url(url: &str) -> bool {
    url.starts_with(MEMORY_SCHEME) || POSTGRES_SCHEMES.iter().any(|s| url.starts_with(s))
}

/// The store name becomes a quoted Postgres schema identifier, so it is restricted up front.
pub fn is_valid_store_name(name: &str) -> bool {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    NAME_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("valid regex"))
        .is_match(name)
}

fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(()),
    }
}

fn parse_positive<T>(value: Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    value
        .map(|v| match v.trim().parse::<T>() {
            Ok(n) if n > T::default() => Ok(n),
            _ => Err(anyhow::anyhow!("{} must be a positive number", key)),
        })
        .transpose()
}
