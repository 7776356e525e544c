use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("PageSpeed API error: {status} - {message}")]
    Service { status: u16, message: String },

    #[error("Malformed audit payload: {0}")]
    MalformedPayload(String),

    #[error("Another analysis is already in progress")]
    Busy,

    #[error("Failed to read audit payload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse audit payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to render PDF report: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Single human-readable message suitable for end users. Detail stays
    /// in the logs; callers print only this.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Service { .. } => {
                "PageSpeed Insights API is currently unavailable. Please try again later."
            }
            Error::InvalidUrl(_) => "Please enter a valid URL (e.g., https://example.com)",
            Error::Transport(_) => "Network error. Please check your connection and try again.",
            _ => "Analysis failed. Please check the URL and try again.",
        }
    }
}
