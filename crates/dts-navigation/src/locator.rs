//! API locators embedded in navigation documents.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Default API base path.
pub const DEFAULT_BASE_URL: &str = "/api/dts";

/// Unreserved characters: A-Z a-z 0-9 - . _ ~
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a query value.
fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE_SET).to_string()
}

/// Builds navigation and passage locators for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locators {
    base: String,
    doc_id: String,
}

impl Locators {
    /// Create locators below `base_url`; trailing slashes are dropped.
    #[must_use]
    pub fn new(base_url: &str, doc_id: impl Into<String>) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_owned(),
            doc_id: doc_id.into(),
        }
    }

    /// Document id the locators refer to.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// `{base}/navigation?id={doc}[&ref={ref}][&level={level}]`.
    #[must_use]
    pub fn navigation(&self, reference: Option<&str>, level: Option<u32>) -> String {
        let mut locator = format!("{}/navigation?id={}", self.base, encode(&self.doc_id));
        if let Some(reference) = reference {
            locator.push_str("&ref=");
            locator.push_str(&encode(reference));
        }
        if let Some(level) = level {
            locator.push_str("&level=");
            locator.push_str(&level.to_string());
        }
        locator
    }

    /// Locator of the whole document's navigation.
    #[must_use]
    pub fn resource(&self) -> String {
        self.navigation(None, None)
    }

    /// `{base}/document?id={doc}&ref={ref}` with a literal `{ref}` placeholder.
    #[must_use]
    pub fn passage_template(&self) -> String {
        format!(
            "{}/document?id={}&ref={{ref}}",
            self.base,
            encode(&self.doc_id)
        )
    }
}
