//! Endpoint configuration for the provider REST API.

use std::time::Duration;

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://rest-api.wm.com/";
/// Upper bound for a single network call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Locale sent with every request.
pub const DEFAULT_LOCALE: &str = "en_US";

const ENV_API_KEY_AUTH: &str = "CURBSIDE_API_KEY_AUTH";
const ENV_API_KEY_ACCOUNTS: &str = "CURBSIDE_API_KEY_ACCOUNTS";
const ENV_API_KEY_SERVICES: &str = "CURBSIDE_API_KEY_SERVICES";
const ENV_API_KEY_HOLIDAYS: &str = "CURBSIDE_API_KEY_HOLIDAYS";
const ENV_BASE_URL: &str = "CURBSIDE_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "CURBSIDE_TIMEOUT_SECS";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Errors raised while assembling a [`ClientConfig`].
pub enum ConfigError {
    /// A required setting is absent.
    #[error("Missing setting: {0}")]
    Missing(&'static str),
    /// A setting is present but unusable.
    #[error("Invalid setting {name}: {value}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Operation family a request belongs to; each family is signed with its own api key.
pub enum EndpointCategory {
    /// `user/authenticate`.
    Authentication,
    /// Linked account lookup.
    Accounts,
    /// Service and pickup lookup.
    Services,
    /// Holiday advisory lookup.
    Holidays,
}

#[derive(Debug, Clone)]
/// Vendor api keys, one per [`EndpointCategory`].
pub struct ApiKeys {
    /// Key for authentication.
    pub authentication: String,
    /// Key for account lookups.
    pub accounts: String,
    /// Key for service and pickup lookups.
    pub services: String,
    /// Key for holiday lookups.
    pub holidays: String,
}

impl ApiKeys {
    /// Key to send for `category`.
    #[must_use]
    pub fn for_category(&self, category: EndpointCategory) -> &str {
        match category {
            EndpointCategory::Authentication => &self.authentication,
            EndpointCategory::Accounts => &self.accounts,
            EndpointCategory::Services => &self.services,
            EndpointCategory::Holidays => &self.holidays,
        }
    }
}

#[derive(Debug, Clone)]
/// Where and how the client talks to the provider.
pub struct ClientConfig {
    base_url: String,
    api_keys: ApiKeys,
    timeout: Duration,
    locale: String,
}

impl ClientConfig {
    /// Configuration against the production endpoint.
    #[must_use]
    pub fn new(api_keys: ApiKeys) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_keys,
            timeout: DEFAULT_TIMEOUT,
            locale: DEFAULT_LOCALE.to_owned(),
        }
    }

    /// Read configuration from `CURBSIDE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when an api key is missing or the timeout is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when an api key is missing or the timeout is not a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let api_keys = ApiKeys {
            authentication: required(ENV_API_KEY_AUTH)?,
            accounts: required(ENV_API_KEY_ACCOUNTS)?,
            services: required(ENV_API_KEY_SERVICES)?,
            holidays: required(ENV_API_KEY_HOLIDAYS)?,
        };

        let mut config = Self::new(api_keys);

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            config = config.with_base_url(base_url);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_err| ConfigError::Invalid {
                    name: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Override the REST endpoint. A trailing slash is added when missing.
    #[must_use]
    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Override the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the locale.
    #[must_use]
    pub fn with_locale<L: Into<String>>(mut self, locale: L) -> Self {
        self.locale = locale.into();
        self
    }

    /// REST endpoint, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path below the REST endpoint.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Vendor api keys.
    #[must_use]
    pub fn api_keys(&self) -> &ApiKeys {
        &self.api_keys
    }

    /// Per-call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Locale sent as `lang`.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            (ENV_API_KEY_AUTH, "auth"),
            (ENV_API_KEY_ACCOUNTS, "accounts"),
            (ENV_API_KEY_SERVICES, "services"),
            (ENV_API_KEY_HOLIDAYS, "holidays"),
        ])
    }

    #[test]
    fn test_from_lookup_defaults() {
        let vars = full_env();
        let config = ClientConfig::from_lookup(|name| vars.get(name).cloned()).unwrap();

        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.locale(), "en_US");
        assert_eq!(
            config.api_keys().for_category(EndpointCategory::Holidays),
            "holidays"
        );
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let mut vars = full_env();
        vars.remove(ENV_API_KEY_SERVICES);

        let err = ClientConfig::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_API_KEY_SERVICES));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let mut vars = full_env();
        vars.insert(ENV_BASE_URL.to_owned(), "http://localhost:8080/api".to_owned());
        vars.insert(ENV_TIMEOUT_SECS.to_owned(), "5".to_owned());

        let config = ClientConfig::from_lookup(|name| vars.get(name).cloned()).unwrap();

        assert_eq!(config.base_url(), "http://localhost:8080/api/");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(
            config.endpoint("/user/authenticate"),
            "http://localhost:8080/api/user/authenticate"
        );
    }

    #[test]
    fn test_from_lookup_bad_timeout() {
        let mut vars = full_env();
        vars.insert(ENV_TIMEOUT_SECS.to_owned(), "soon".to_owned());

        let err = ClientConfig::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_TIMEOUT_SECS, .. }));
    }
}
