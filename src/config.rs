use crate::domain::ListOrder;
use anyhow::{Context, Result, bail};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_WIKIJS_URL: &str = "http://wikijs:3000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOCALE: &str = "en";

#[derive(Clone)]
pub struct ProxyConfig {
    pub wikijs_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub default_locale: String,
    pub list_order: ListOrder,
    pub bind_addr: SocketAddr,
}

// keep the credential out of logs
impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("wikijs_url", &self.wikijs_url)
            .field("api_key", &"***")
            .field("request_timeout", &self.request_timeout)
            .field("default_locale", &self.default_locale)
            .field("list_order", &self.list_order)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Fails if `WIKIJS_API_KEY` is
    /// missing or blank, or if a set value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let wikijs_url = lookup("WIKIJS_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WIKIJS_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let api_key = match lookup("WIKIJS_API_KEY") {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => bail!(
                "WIKIJS_API_KEY is not set. Create an API key in Wiki.js Administration > API Access and export it."
            ),
        };

        let timeout_secs = match lookup("WIKIJS_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("WIKIJS_TIMEOUT_SECS is not a whole number: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("WIKIJS_TIMEOUT_SECS must be greater than zero");
        }

        let default_locale = lookup("WIKIJS_DEFAULT_LOCALE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        let list_order = match lookup("WIKIJS_LIST_ORDER") {
            Some(raw) => raw
                .parse::<ListOrder>()
                .map_err(|e| anyhow::anyhow!("WIKIJS_LIST_ORDER: {e}"))?,
            None => ListOrder::default(),
        };

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR is not a socket address: {bind_raw}"))?;

        Ok(Self {
            wikijs_url,
            api_key,
            request_timeout: Duration::from_secs(timeout_secs),
            default_locale,
            list_order,
            bind_addr,
        })
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.wikijs_url)
    }
}
