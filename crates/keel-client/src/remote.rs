use crate::error::ClientError;
use chrono::{DateTime, Utc};
use std::io::Cursor;
use suppaftp::{FtpError, FtpStream, Mode, Status, list, types::FileType};
use tokio::{sync::Mutex, task};
use tracing::{debug, info};

///
/// RemoteConfig
/// Connection settings for one remote file-transfer session.
///

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl RemoteConfig {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.host.trim().is_empty() {
            return Err(ClientError::config("remote host must not be blank"));
        }
        if self.username.trim().is_empty() {
            return Err(ClientError::config("remote username must not be blank"));
        }
        if self.password.trim().is_empty() {
            return Err(ClientError::config("remote password must not be blank"));
        }

        Ok(())
    }

    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

///
/// RemoteFileInfo
/// One entry of a remote folder listing.
///

#[derive(Clone, Debug)]
pub struct RemoteFileInfo {
    pub name: String,
    pub full_name: String,
    pub modified: Option<DateTime<Utc>>,
}

///
/// RemoteFileClient
///
/// File verbs over one authenticated remote transfer session. The protocol
/// work is blocking, so every verb hops onto the blocking pool with the
/// session checked out for the duration of the call.
///

pub struct RemoteFileClient {
    config: RemoteConfig,
    session: Mutex<Option<FtpStream>>,
}

impl RemoteFileClient {
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    /// Open and authenticate the session. Validates the configuration
    /// first; blank credentials never reach the wire.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.config.validate()?;

        let config = self.config.clone();
        let address = config.address();
        info!(host = %config.host, port = config.port, "connecting remote file session");

        let stream = task::spawn_blocking(move || -> Result<FtpStream, FtpError> {
            let mut stream = FtpStream::connect(config.address())?;
            // extended passive mode behaves better behind NAT
            stream.set_mode(Mode::ExtendedPassive);
            stream.login(&config.username, &config.password)?;
            stream.transfer_type(FileType::Binary)?;
            Ok(stream)
        })
        .await
        .map_err(|err| ClientError::Task(err.to_string()))?
        .map_err(|source| ClientError::Remote {
            op: "connect",
            path: address,
            source,
        })?;

        *self.session.lock().await = Some(stream);

        Ok(())
    }

    #[must_use]
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Close the session; a no-op when already disconnected.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        let Some(mut stream) = self.session.lock().await.take() else {
            return Ok(());
        };

        info!("closing remote file session");
        task::spawn_blocking(move || stream.quit())
            .await
            .map_err(|err| ClientError::Task(err.to_string()))?
            .map_err(|source| ClientError::Remote {
                op: "disconnect",
                path: String::new(),
                source,
            })
    }

    /// True when a file exists at the path.
    pub async fn exists(&self, path: &str) -> Result<bool, ClientError> {
        debug!(path, "checking remote file");

        let target = path.to_owned();
        self.with_session("exists", path, move |stream| {
            match stream.size(&target) {
                Ok(_) => Ok(true),
                // 550 means "no such file" rather than a broken session
                Err(FtpError::UnexpectedResponse(response))
                    if response.status == Status::FileUnavailable =>
                {
                    Ok(false)
                }
                Err(err) => Err(err),
            }
        })
        .await
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<(), ClientError> {
        info!(from, to, "renaming remote file");

        let (source_path, target_path) = (from.to_owned(), to.to_owned());
        self.with_session("rename", from, move |stream| {
            stream.rename(&source_path, &target_path)
        })
        .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        info!(path, "deleting remote file");

        let target = path.to_owned();
        self.with_session("delete", path, move |stream| stream.rm(&target))
            .await
    }

    /// Upload a byte buffer to the path; returns the bytes written.
    pub async fn upload(&self, bytes: Vec<u8>, path: &str) -> Result<u64, ClientError> {
        info!(path, len = bytes.len(), "uploading remote file");

        let target = path.to_owned();
        self.with_session("upload", path, move |stream| {
            stream.put_file(&target, &mut Cursor::new(bytes))
        })
        .await
    }

    /// List the files in a remote folder.
    pub async fn list(&self, dir: &str) -> Result<Vec<RemoteFileInfo>, ClientError> {
        info!(dir, "listing remote folder");

        let target = dir.to_owned();
        let lines = self
            .with_session("list", dir, move |stream| stream.list(Some(target.as_str())))
            .await?;

        let base = dir.trim_end_matches('/');
        Ok(lines
            .iter()
            .filter_map(|line| {
                let file = list::File::try_from(line.as_str()).ok()?;
                Some(RemoteFileInfo {
                    name: file.name().to_owned(),
                    full_name: format!("{base}/{}", file.name()),
                    modified: Some(DateTime::<Utc>::from(file.modified())),
                })
            })
            .collect())
    }

    /// Read a whole remote file into memory.
    pub async fn read_all_bytes(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        info!(path, "reading remote file");

        let target = path.to_owned();
        self.with_session("read_all_bytes", path, move |stream| {
            stream.retr_as_buffer(&target).map(Cursor::into_inner)
        })
        .await
    }

    // Check the session out, run the blocking verb on the pool, check the
    // session back in, and attach op/path context to failures.
    async fn with_session<T, F>(
        &self,
        op: &'static str,
        path: &str,
        verb: F,
    ) -> Result<T, ClientError>
    where
        T: Send + 'static,
        F: FnOnce(&mut FtpStream) -> Result<T, FtpError> + Send + 'static,
    {
        let mut guard = self.session.lock().await;
        let mut stream = guard.take().ok_or(ClientError::NotConnected)?;

        let (stream, result) = task::spawn_blocking(move || {
            let result = verb(&mut stream);
            (stream, result)
        })
        .await
        .map_err(|err| ClientError::Task(err.to_string()))?;

        *guard = Some(stream);

        result.map_err(|source| ClientError::Remote {
            op,
            path: path.to_owned(),
            source,
        })
    }
}

///
/// TESTS
///
