//! Backend Url

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Base url of a Lendaswap backend
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiUrl(String);

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl ApiUrl {
    fn format_url(url: &str) -> Result<String, Error> {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(Error::InvalidUrl);
        }

        let (protocol, rest) = url.split_once("://").ok_or(Error::InvalidUrl)?;
        let (host, path) = match rest.split_once('/') {
            Some((host, path)) => (host, path),
            None => (rest, ""),
        };
        if host.is_empty() {
            return Err(Error::InvalidUrl);
        }

        let mut formatted_url = format!("{}://{}", protocol.to_lowercase(), host.to_lowercase());
        if !path.is_empty() {
            formatted_url.push('/');
            formatted_url.push_str(path);
        }
        Ok(formatted_url)
    }

    /// Join onto url
    pub fn join(&self, path: &str) -> Result<Url, Error> {
        let url = Url::parse(&self.0)?;

        let base_path = url.path();
        let normalized_path = if base_path.ends_with('/') {
            format!("{}{}", base_path, path)
        } else {
            format!("{}/{}", base_path, path)
        };

        let mut result = url.clone();
        result.set_path(&normalized_path);
        Ok(result)
    }

    /// Append path elements onto the URL
    pub fn join_paths(&self, path_elements: &[&str]) -> Result<Url, Error> {
        self.join(&path_elements.join("/"))
    }

    /// Websocket url for the given path elements
    ///
    /// `https` maps to `wss`, anything else to `ws`.
    pub fn ws_url(&self, path_elements: &[&str]) -> Result<Url, Error> {
        let mut url = self.join_paths(path_elements)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|_| Error::InvalidUrl)?;
        Ok(url)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let formatted = Self::format_url(url)?;
        Url::parse(&formatted)?;
        Ok(Self(formatted))
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
