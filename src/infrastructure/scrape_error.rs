//! Scrape error taxonomy
//!
//! Only startup errors are fatal. Page-level errors drop a single product,
//! image errors drop a single image, and field-level misses never surface as
//! errors at all (resolvers fall through to their defaults).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Input table has no '{column}' column")]
    MissingInputColumn { column: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed for {url}: {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Browser rendering failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Empty page body from {url}")]
    EmptyPage { url: String },

    #[error("Image download failed for {url}: {reason}")]
    ImageDownload { url: String, reason: String },

    #[error("Image rejected for {url}: {reason}")]
    ImageRejected { url: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScrapeError {
    pub fn missing_input_column(column: &str) -> Self {
        Self::MissingInputColumn {
            column: column.to_string(),
        }
    }

    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn fetch(url: &str, status: Option<u16>, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            status,
            message: message.to_string(),
        }
    }

    pub fn render(url: &str, message: impl ToString) -> Self {
        Self::Render {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn image_download(url: &str, reason: impl ToString) -> Self {
        Self::ImageDownload {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn image_rejected(url: &str, reason: impl ToString) -> Self {
        Self::ImageRejected {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error must abort the whole run
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingInputColumn { .. } | Self::Config { .. })
    }

    /// HTTP status attached to a fetch failure, if any
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => *status,
            _ => None,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_startup_errors_are_fatal() {
        assert!(ScrapeError::missing_input_column("url").is_fatal());
        assert!(
            ScrapeError::Config {
                message: "bad".into()
            }
            .is_fatal()
        );
        assert!(!ScrapeError::fetch("https://x", Some(503), "unavailable").is_fatal());
        assert!(!ScrapeError::render("https://x", "timeout").is_fatal());
        assert!(!ScrapeError::image_download("https://x/a.jpg", "timeout").is_fatal());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = ScrapeError::missing_input_column("url");
        assert_eq!(err.to_string(), "Input table has no 'url' column");

        let err = ScrapeError::fetch("https://loja.example/p", Some(404), "HTTP 404");
        assert_eq!(err.http_status(), Some(404));
        assert!(err.to_string().contains("https://loja.example/p"));
    }
}
