use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Request(String),

    #[error("Search API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}
