//! Universal links wrapping an encoded payload.

use std::{fmt, str::FromStr};

/// Query parameter that carries the payload.
pub const PAYLOAD_QUERY_PARAM: &str = "p";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LinkEnvironment {
    #[default]
    Production,
    Staging,
    Development,
}

impl LinkEnvironment {
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Production => "https://base.app/base-pay",
            Self::Staging => "https://staging.base.app/base-pay",
            Self::Development => "http://localhost:3005/base-pay",
        }
    }
}

impl fmt::Display for LinkEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
        };
        f.write_str(name)
    }
}

impl FromStr for LinkEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown link environment: {other}")),
        }
    }
}

/// Build `<base>?p=<payload>`. base64url payloads are already URL-safe.
pub fn to_universal_link(payload: &str, environment: LinkEnvironment) -> String {
    format!("{}?{PAYLOAD_QUERY_PARAM}={payload}", environment.base_url())
}

/// Extract the payload from a universal link produced by [`to_universal_link`].
///
/// Returns `None` when the input has no query string or no `p` parameter.
pub fn payload_from_link(link: &str) -> Option<&str> {
    let (_, query) = link.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query.split('&').find_map(|pair| match pair.split_once('=') {
        Some((PAYLOAD_QUERY_PARAM, value)) if !value.is_empty() => Some(value),
        _ => None,
    })
}
