//! URL presentation
//!
//! Stored URLs are never validated. Whether one renders as an openable link
//! or as an "Invalid URL:" label is decided here, at display time only.

use std::fmt;

use url::Url;

/// How a stored URL string is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlDisplay {
    /// Parses as an absolute URL; `raw` is the string as stored
    Link { url: Url, raw: String },
    /// Anything else, kept verbatim
    Invalid(String),
}

impl UrlDisplay {
    pub fn classify(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) => UrlDisplay::Link {
                url,
                raw: raw.to_string(),
            },
            Err(_) => UrlDisplay::Invalid(raw.to_string()),
        }
    }
}

impl fmt::Display for UrlDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlDisplay::Link { raw, .. } => write!(f, "{}", raw),
            UrlDisplay::Invalid(raw) => write!(f, "Invalid URL: {}", raw),
        }
    }
}
