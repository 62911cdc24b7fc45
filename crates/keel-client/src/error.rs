use reqwest::{StatusCode, Url};
use thiserror::Error as ThisError;

///
/// ClientError
///
/// Transport-layer error surface. Configuration problems are reported
/// synchronously before any request is made and are never retried;
/// transport failures carry the status and target so callers can decide.
///

#[derive(Debug, ThisError)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("failed to access {url}, status code: {status}")]
    Transport { status: StatusCode, url: Url },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("failed to decode XML response: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("remote file session is not connected")]
    NotConnected,

    #[error("remote file operation '{op}' failed for '{path}': {source}")]
    Remote {
        op: &'static str,
        path: String,
        #[source]
        source: suppaftp::FtpError,
    },

    #[error("background transfer task failed: {0}")]
    Task(String),
}

impl ClientError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
