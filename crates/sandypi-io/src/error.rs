//! Error type shared by the io adapters.

use std::path::PathBuf;

use sandypi_export::PreviewError;

/// Errors from talking to the table or writing files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The request never got a response, or the response body could not
    /// be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The server accepted the request but refused the drawing.
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// Writing a local file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// Fetched G-code could not be turned into a preview.
    #[error(transparent)]
    Preview(#[from] PreviewError),
}
