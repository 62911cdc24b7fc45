use crate::error::ClientError;
use reqwest::{Method, Response};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

///
/// Auth
///
/// Per-request authentication. Credentials are validated before the
/// request is built; blank identification fields are a configuration
/// error, not a transport failure.
///

#[derive(Clone, Debug)]
pub enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
}

impl Auth {
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        match self {
            Self::Basic { username, password } => {
                if username.trim().is_empty() {
                    return Err(ClientError::config("basic auth username must not be blank"));
                }
                if password.trim().is_empty() {
                    return Err(ClientError::config("basic auth password must not be blank"));
                }
            }
            Self::Bearer(token) => {
                if token.trim().is_empty() {
                    return Err(ClientError::config("bearer token must not be blank"));
                }
            }
        }

        Ok(())
    }
}

///
/// RequestOptions
/// Optional per-request knobs shared by every verb method.
///

#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub auth: Option<Auth>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

///
/// HttpClient
///
/// Thin verb wrapper over a shared [`reqwest::Client`]: auth, extra
/// headers, and status checking in one place. Non-success statuses
/// surface as [`ClientError::Transport`]; nothing is retried here.
///

#[derive(Clone, Debug, Default)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an externally configured client (pooling, proxies, TLS).
    #[must_use]
    pub const fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    // --- raw verbs ---

    pub async fn get(&self, url: &str, opts: &RequestOptions) -> Result<Response, ClientError> {
        self.send::<()>(Method::GET, url, None, opts).await
    }

    pub async fn delete(&self, url: &str, opts: &RequestOptions) -> Result<Response, ClientError> {
        self.send::<()>(Method::DELETE, url, None, opts).await
    }

    pub async fn post<B: Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> Result<Response, ClientError> {
        self.send(Method::POST, url, Some(body), opts).await
    }

    pub async fn put<B: Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> Result<Response, ClientError> {
        self.send(Method::PUT, url, Some(body), opts).await
    }

    pub async fn patch<B: Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> Result<Response, ClientError> {
        self.send(Method::PATCH, url, Some(body), opts).await
    }

    // --- deserializing forms ---

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        opts: &RequestOptions,
    ) -> Result<T, ClientError> {
        Ok(self.get(url, opts).await?.json().await?)
    }

    pub async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> Result<T, ClientError> {
        Ok(self.post(url, body, opts).await?.json().await?)
    }

    pub async fn put_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> Result<T, ClientError> {
        Ok(self.put(url, body, opts).await?.json().await?)
    }

    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        url: &str,
        opts: &RequestOptions,
    ) -> Result<T, ClientError> {
        Ok(self.delete(url, opts).await?.json().await?)
    }

    /// GET a response body deserialized from XML.
    pub async fn get_xml<T: DeserializeOwned>(
        &self,
        url: &str,
        opts: &RequestOptions,
    ) -> Result<T, ClientError> {
        let body = self.get(url, opts).await?.text().await?;
        Ok(quick_xml::de::from_str(&body)?)
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        opts: &RequestOptions,
    ) -> Result<Response, ClientError> {
        if let Some(auth) = &opts.auth {
            auth.validate()?;
        }

        let mut request = self.inner.request(method.clone(), url);

        if let Some(body) = body {
            request = request.json(body);
        }
        match &opts.auth {
            Some(Auth::Basic { username, password }) => {
                request = request.basic_auth(username, Some(password));
            }
            Some(Auth::Bearer(token)) => {
                request = request.bearer_auth(token);
            }
            None => {}
        }
        for (name, value) in &opts.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = opts.timeout {
            request = request.timeout(timeout);
        }

        debug!(%method, url, "sending request");
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Transport {
                status: response.status(),
                url: response.url().clone(),
            });
        }

        Ok(response)
    }
}

///
/// TESTS
///
