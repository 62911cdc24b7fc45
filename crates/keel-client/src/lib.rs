//! Transport collaborators for keel: a thin HTTP verb wrapper and a remote
//! file-transfer client. Both stay at the boundary (configuration
//! validation, authentication, status-to-error mapping, logging) and
//! deliberately nothing more.

pub mod error;
pub mod http;
pub mod remote;

pub use error::ClientError;
pub use http::{Auth, HttpClient, RequestOptions};
pub use remote::{RemoteConfig, RemoteFileClient, RemoteFileInfo};
