//! The uniform result shape returned by every remote operation.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Message used when the transport gives up waiting for a response.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Message used when an operation is attempted without an active session.
pub const NOT_LOGGED_IN: &str = "Not logged in";

/// Success/failure wrapper around an operation payload.
///
/// `ok == false` is a normal value, not an error: transport failures,
/// timeouts and backend refusals all arrive through this type.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub ok: bool,
    pub message: String,
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, payload: T) -> Self {
        Self {
            ok: true,
            message: message.into(),
            payload,
        }
    }

    pub fn failure(message: impl Into<String>, payload: T) -> Self {
        Self {
            ok: false,
            message: message.into(),
            payload,
        }
    }
}

impl Envelope<Value> {
    /// A failure carrying an empty JSON object, the shape used for every
    /// locally synthesized transport failure.
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self::failure(message, empty_object())
    }

    /// Decodes a `{status, msg, data}` response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let wire: WireEnvelope = serde_json::from_slice(body)?;
        Ok(Self {
            ok: wire.status,
            message: wire.msg.unwrap_or_default(),
            payload: wire.data,
        })
    }

    /// Converts the JSON payload into the type an operation promises.
    ///
    /// A successful envelope whose payload does not decode is a
    /// [`CoreError::Payload`]. Failed envelopes fall back to `T::default()`
    /// since backends are loose about the payload they attach to errors.
    pub fn decode<T>(self, operation: &'static str) -> CoreResult<Envelope<T>>
    where
        T: DeserializeOwned + Default,
    {
        let payload = if self.ok {
            serde_json::from_value(self.payload).map_err(|e| CoreError::payload(operation, e))?
        } else {
            serde_json::from_value(self.payload).unwrap_or_default()
        };
        Ok(Envelope {
            ok: self.ok,
            message: self.message,
            payload,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    status: bool,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default = "empty_object")]
    data: Value,
}

pub(crate) fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
