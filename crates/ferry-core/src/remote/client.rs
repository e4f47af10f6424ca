//! The catalog of remote operations.
//!
//! Each call checks the [`Session`] first and returns a synthetic
//! `"Not logged in"` envelope without touching the transport when there is
//! none. Only [`RemoteClient::login`] and [`RemoteClient::logout`] change
//! the session, and only on success.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{CoreError, CoreResult};
use crate::remote::entry::RemoteEntry;
use crate::remote::envelope::{empty_object, Envelope, NOT_LOGGED_IN};
use crate::remote::session::{Session, SessionDescriptor};
use crate::remote::transport::{Reply, Request, Transport, UploadFile};

/// Login form contents.
#[derive(Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "hostIp")]
    pub host_ip: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        host_ip: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host_ip: host_ip.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns `true` when no field is empty.
    pub fn is_complete(&self) -> bool {
        !self.host_ip.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host_ip", &self.host_ip)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One connection reported by the health query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionSummary {
    pub host: String,
    pub username: String,
    #[serde(default)]
    pub connected_since: String,
}

/// Payload of the health query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerStatus {
    pub active_connections: usize,
    #[serde(default)]
    pub connections: Vec<ConnectionSummary>,
}

/// Typed access to the backend endpoints.
#[derive(Clone)]
pub struct RemoteClient {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient").finish_non_exhaustive()
    }
}

impl RemoteClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Authenticates and, on success, activates `session` with the returned
    /// descriptor. A failed login leaves the session as it was.
    ///
    /// # Errors
    ///
    /// [`CoreError::Payload`] if the backend reports success but the payload
    /// is not a session descriptor.
    pub async fn login(
        &self,
        session: &Session,
        credentials: &Credentials,
    ) -> CoreResult<Envelope<Option<SessionDescriptor>>> {
        let body = serde_json::to_value(credentials).map_err(|e| CoreError::Encode(e.to_string()))?;
        let envelope = self.post("/login", body).await;
        if !envelope.ok {
            tracing::warn!(host = %credentials.host_ip, message = %envelope.message, "login rejected");
            return Ok(Envelope::failure(envelope.message, None));
        }

        let descriptor: SessionDescriptor = serde_json::from_value(envelope.payload)
            .map_err(|e| CoreError::payload("login", e))?;
        session.activate(descriptor.clone());
        Ok(Envelope::success(envelope.message, Some(descriptor)))
    }

    /// Ends the session on the backend. The local session is only cleared
    /// when the backend confirms, and only if it still holds the descriptor
    /// this call logged out.
    pub async fn logout(&self, session: &Session) -> CoreResult<Envelope<Value>> {
        let Some(descriptor) = session.current() else {
            return Ok(not_logged_in(empty_object()));
        };
        let body = serde_json::to_value(&descriptor).map_err(|e| CoreError::Encode(e.to_string()))?;
        let envelope = self.post("/logout", body).await;
        if envelope.ok {
            if session.current().is_some_and(|d| d.key == descriptor.key) {
                session.deactivate();
            }
        } else {
            tracing::warn!(message = %envelope.message, "logout rejected");
        }
        Ok(envelope)
    }

    /// Lists the directory at `location`.
    pub async fn list(
        &self,
        session: &Session,
        location: &str,
    ) -> CoreResult<Envelope<Vec<RemoteEntry>>> {
        let Some(d) = session.current() else {
            return Ok(not_logged_in(Vec::new()));
        };
        self.post(
            "/listFiles",
            json!({ "hostIp": d.host_ip, "username": d.username, "location": location }),
        )
        .await
        .decode("list")
    }

    /// Fetches a file. A successful download arrives as [`Reply::Raw`]; any
    /// structured reply is a failure description.
    pub async fn fetch_file(&self, session: &Session, remote_path: &str) -> CoreResult<Reply> {
        let Some(d) = session.current() else {
            return Ok(Reply::Structured(not_logged_in(empty_object())));
        };
        let request = Request::post_json(
            "/getFile",
            json!({ "hostIp": d.host_ip, "username": d.username, "remotePath": remote_path }),
        );
        Ok(self.transport.send(request).await)
    }

    /// Uploads `file` into the remote directory `location`.
    ///
    /// Connection details travel in the `upload-params` header and the
    /// declared size in `file-size`, so the backend can route the stream
    /// before reading the body.
    pub async fn upload_file(
        &self,
        session: &Session,
        file: UploadFile,
        location: &str,
    ) -> CoreResult<Envelope<Value>> {
        let Some(d) = session.current() else {
            return Ok(not_logged_in(empty_object()));
        };
        let params = json!({ "hostIp": d.host_ip, "username": d.username, "location": location });
        let headers = vec![
            ("upload-params".to_string(), params.to_string()),
            ("file-size".to_string(), file.size.to_string()),
        ];
        let reply = self
            .transport
            .send(Request::upload("/uploadfile", file, headers))
            .await;
        Ok(reply.into_envelope())
    }

    pub async fn mkdir(&self, session: &Session, path: &str) -> CoreResult<Envelope<Value>> {
        self.path_operation(session, "/mkdir", path).await
    }

    pub async fn remove(&self, session: &Session, path: &str) -> CoreResult<Envelope<Value>> {
        self.path_operation(session, "/remove", path).await
    }

    pub async fn rename(
        &self,
        session: &Session,
        old_path: &str,
        new_path: &str,
    ) -> CoreResult<Envelope<Value>> {
        let Some(d) = session.current() else {
            return Ok(not_logged_in(empty_object()));
        };
        Ok(self
            .post(
                "/rename",
                json!({
                    "hostIp": d.host_ip,
                    "username": d.username,
                    "oldPath": old_path,
                    "newPath": new_path,
                }),
            )
            .await)
    }

    /// Returns the lines of `df` output on the remote host.
    pub async fn disk_usage(&self, session: &Session) -> CoreResult<Envelope<Vec<String>>> {
        self.root_query(session, "/getDf", "disk usage").await
    }

    /// Returns the remote shell history, oldest first.
    pub async fn history(&self, session: &Session) -> CoreResult<Envelope<Vec<String>>> {
        self.root_query(session, "/getHistory", "history").await
    }

    /// Queries backend health. Works without a session.
    pub async fn server_status(&self) -> CoreResult<Envelope<ServerStatus>> {
        self.transport
            .send(Request::get("/status"))
            .await
            .into_envelope()
            .decode("status")
    }

    async fn path_operation(
        &self,
        session: &Session,
        endpoint: &'static str,
        path: &str,
    ) -> CoreResult<Envelope<Value>> {
        let Some(d) = session.current() else {
            return Ok(not_logged_in(empty_object()));
        };
        Ok(self
            .post(
                endpoint,
                json!({ "hostIp": d.host_ip, "username": d.username, "path": path }),
            )
            .await)
    }

    async fn root_query(
        &self,
        session: &Session,
        endpoint: &'static str,
        operation: &'static str,
    ) -> CoreResult<Envelope<Vec<String>>> {
        let Some(d) = session.current() else {
            return Ok(not_logged_in(Vec::new()));
        };
        self.post(
            endpoint,
            json!({ "hostIp": d.host_ip, "username": d.username, "path": "/" }),
        )
        .await
        .decode(operation)
    }

    async fn post(&self, endpoint: &'static str, body: Value) -> Envelope<Value> {
        self.transport
            .send(Request::post_json(endpoint, body))
            .await
            .into_envelope()
    }
}

fn not_logged_in<T>(payload: T) -> Envelope<T> {
    Envelope::failure(NOT_LOGGED_IN, payload)
}
