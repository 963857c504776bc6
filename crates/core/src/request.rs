//! Intercepted requests and their classification.
//!
//! Classification order:
//! 1. method other than GET -> pass-through
//! 2. disallowed scheme (extension-internal, data, blob) -> pass-through
//! 3. HTML document (destination or Accept header) -> document
//! 4. image (destination or Accept header) -> image
//! 5. anything else -> static asset

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// Request destination hint reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    #[default]
    Empty,
    Other,
}

impl FromStr for Destination {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "document" | "iframe" | "frame" => Destination::Document,
            "image" => Destination::Image,
            "script" | "worker" => Destination::Script,
            "style" => Destination::Style,
            "font" => Destination::Font,
            "manifest" => Destination::Manifest,
            "" => Destination::Empty,
            _ => Destination::Other,
        })
    }
}

/// Outcome of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    PassThrough,
    Document,
    Image,
    StaticAsset,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::PassThrough => write!(f, "pass-through"),
            Classification::Document => write!(f, "document"),
            Classification::Image => write!(f, "image"),
            Classification::StaticAsset => write!(f, "static-asset"),
        }
    }
}

/// A request as the host hands it over, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FetchRequest {
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub accept: Option<String>,
    #[serde(default)]
    pub destination: Destination,
}

fn default_method() -> String {
    "GET".into()
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: default_method(), url: url.into(), accept: None, destination: Destination::Empty }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Shorthand for a top-level navigation.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::get(url)
            .with_accept("text/html,application/xhtml+xml")
            .with_destination(Destination::Document)
    }
}

/// Key under which a response is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn get(url: &Url) -> Self {
        Self { method: "GET".into(), url: url.to_string() }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A classified request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: String,
    url: Url,
    accept: Option<String>,
    destination: Destination,
    classification: Classification,
}

impl RequestDescriptor {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn key(&self) -> RequestKey {
        RequestKey { method: self.method.clone(), url: self.url.to_string() }
    }

    /// Descriptor for a plain GET of `url`, used for shell and fallback lookups.
    pub fn shell(url: Url) -> Self {
        Self {
            method: "GET".into(),
            url,
            accept: None,
            destination: Destination::Empty,
            classification: Classification::StaticAsset,
        }
    }
}

/// Classify an intercepted request.
///
/// Relative URLs are resolved against `base` and the fragment is dropped, so
/// `/post.html#comments` and `/post.html` share one store key. A URL that cannot be parsed is an
/// `InvalidUrl` error; a disallowed method or scheme is not an error but a
/// pass-through classification.
pub fn classify(request: &FetchRequest, base: &Url, disallowed_schemes: &[String]) -> Result<RequestDescriptor, Error> {
    let mut url = base
        .join(request.url.trim())
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", request.url)))?;
    url.set_fragment(None);
    let method = request.method.trim().to_ascii_uppercase();

    let classification = if method != "GET" {
        Classification::PassThrough
    } else if disallowed_schemes.iter().any(|s| s.eq_ignore_ascii_case(url.scheme()))
        || !matches!(url.scheme(), "http" | "https")
    {
        Classification::PassThrough
    } else if request.destination == Destination::Document || accepts(request.accept.as_deref(), "text/html") {
        Classification::Document
    } else if request.destination == Destination::Image || accepts(request.accept.as_deref(), "image/") {
        Classification::Image
    } else {
        Classification::StaticAsset
    };

    Ok(RequestDescriptor {
        method,
        url,
        accept: request.accept.clone(),
        destination: request.destination,
        classification,
    })
}

fn accepts(accept: Option<&str>, media: &str) -> bool {
    accept
        .map(|a| a.split(',').any(|part| part.trim().to_ascii_lowercase().starts_with(media)))
        .unwrap_or(false)
}
