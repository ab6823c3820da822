use thiserror::Error;
use waktu_core::ValidationError;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid payload for zone {zone}: {reason}")]
    InvalidPayload { zone: String, reason: String },

    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("timed out after {waited_ms}ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ScraperError {
    /// `true` when the source answered but its data was unusable, as opposed
    /// to a transport or page failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, ScraperError::Validation(_))
    }
}

/// Failures talking to a WebDriver endpoint.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("WebDriver transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("stale element reference: {0}")]
    StaleElement(String),

    #[error("WebDriver error \"{error}\": {message}")]
    WebDriver { error: String, message: String },

    #[error("malformed WebDriver response: {0}")]
    InvalidResponse(String),
}

impl BrowserError {
    /// Conditions the render poll loop should ride out.
    #[must_use]
    pub fn is_transient_dom(&self) -> bool {
        matches!(
            self,
            BrowserError::NoSuchElement(_) | BrowserError::StaleElement(_)
        )
    }
}
