//! Application configuration parsed from environment variables.

use std::str::FromStr;

use time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: i64 = 300;
pub const DEFAULT_REFRESH_GRACE_SECS: i64 = 300;
pub const DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required")]
    Missing { var: &'static str },
    #[error("{var}: invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Lifetime and security flags applied to every session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Base lifetime T of `access_token`, `username` and `token_type`.
    pub ttl: Duration,
    /// Extra window G the `refresh_token` outlives the others by.
    pub refresh_grace: Duration,
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            refresh_grace: Duration::seconds(DEFAULT_REFRESH_GRACE_SECS),
            secure: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for UpstreamTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the todo/identity REST API, without a trailing slash.
    pub api_url: String,
    pub port: u16,
    pub cookies: CookiePolicy,
    pub timeouts: UpstreamTimeouts,
    /// When set, the route guard sends every page other than `/` and
    /// `/login` back to `/`.
    pub strict_allowlist: bool,
}

impl AppConfig {
    /// Build typed config from process environment variables.
    ///
    /// Required:
    /// - `API_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `COOKIE_SECURE`: defaults to true only when `APP_ENV=production`
    /// - `SESSION_TTL_SECS`: default 300
    /// - `REFRESH_GRACE_SECS`: default 300
    /// - `UPSTREAM_REQUEST_TIMEOUT_SECS`: default 10
    /// - `UPSTREAM_CONNECT_TIMEOUT_SECS`: default 5
    /// - `GUARD_STRICT_ALLOWLIST`: default true
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `API_URL` is missing or a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `API_URL` is missing or a value fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing { var: "API_URL" })?;

        let production = lookup("APP_ENV").is_some_and(|env| env.trim().eq_ignore_ascii_case("production"));
        let secure = parse_var(&lookup, "COOKIE_SECURE", production, parse_bool)?;

        let ttl_secs = parse_var(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS, positive)?;
        let grace_secs = parse_var(&lookup, "REFRESH_GRACE_SECS", DEFAULT_REFRESH_GRACE_SECS, positive)?;
        // refresh_token lives ttl + grace; the sum must fit a cookie max-age.
        if ttl_secs.checked_add(grace_secs).is_none() {
            return Err(ConfigError::Invalid { var: "REFRESH_GRACE_SECS", value: grace_secs.to_string() });
        }

        let timeouts = UpstreamTimeouts {
            request_secs: parse_var(
                &lookup,
                "UPSTREAM_REQUEST_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS,
                positive,
            )?,
            connect_secs: parse_var(
                &lookup,
                "UPSTREAM_CONNECT_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
                positive,
            )?,
        };

        Ok(Self {
            api_url,
            port: parse_var(&lookup, "PORT", DEFAULT_PORT, |raw| raw.parse().ok())?,
            cookies: CookiePolicy {
                ttl: Duration::seconds(ttl_secs),
                refresh_grace: Duration::seconds(grace_secs),
                secure,
            },
            timeouts,
            strict_allowlist: parse_var(&lookup, "GUARD_STRICT_ALLOWLIST", true, parse_bool)?,
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn positive<T>(raw: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    raw.trim().parse::<T>().ok().filter(|v| *v > T::default())
}

fn parse_var<F, T>(
    lookup: &F,
    var: &'static str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => parse(raw.trim()).ok_or(ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
