//! The single logical connection to the remote host.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Identifies an authenticated connection held by the backend.
///
/// Returned by the login call and echoed back on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    /// Credential token issued by the backend for this connection.
    pub key: String,
    #[serde(rename = "hostIp")]
    pub host_ip: String,
    pub username: String,
}

impl SessionDescriptor {
    /// Returns a display label like `"user@host"`.
    pub fn display_label(&self) -> String {
        format!("{}@{}", self.username, self.host_ip)
    }
}

/// Holds at most one active [`SessionDescriptor`].
///
/// `activate` and `deactivate` are the only mutators. Readers get a clone
/// from [`Session::current`], so a logout that lands while a request is in
/// flight cannot invalidate the fields that request already captured.
#[derive(Debug, Default)]
pub struct Session {
    descriptor: RwLock<Option<SessionDescriptor>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any existing descriptor.
    pub fn activate(&self, descriptor: SessionDescriptor) {
        tracing::info!(session = %descriptor.display_label(), "session activated");
        *self
            .descriptor
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(descriptor);
    }

    pub fn deactivate(&self) {
        let previous = self
            .descriptor
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            tracing::info!(session = %previous.display_label(), "session deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.descriptor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns a snapshot of the active descriptor.
    pub fn current(&self) -> Option<SessionDescriptor> {
        self.descriptor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(key: &str) -> SessionDescriptor {
        SessionDescriptor {
            key: key.to_string(),
            host_ip: "10.0.0.5:22".to_string(),
            username: "bob".to_string(),
        }
    }

    #[test]
    fn new_session_is_inactive() {
        let session = Session::new();
        assert!(!session.is_active());
        assert!(session.current().is_none());
    }

    #[test]
    fn activate_then_deactivate() {
        let session = Session::new();
        session.activate(descriptor("k1"));
        assert!(session.is_active());
        assert_eq!(session.current(), Some(descriptor("k1")));

        session.deactivate();
        assert!(!session.is_active());
    }

    #[test]
    fn activate_replaces_previous() {
        let session = Session::new();
        session.activate(descriptor("k1"));
        session.activate(descriptor("k2"));
        assert_eq!(session.current().unwrap().key, "k2");
    }

    #[test]
    fn snapshot_survives_deactivate() {
        let session = Session::new();
        session.activate(descriptor("k1"));
        let snapshot = session.current().unwrap();
        session.deactivate();
        assert_eq!(snapshot.key, "k1");
    }

    #[test]
    fn descriptor_uses_wire_field_names() {
        let json = serde_json::to_value(descriptor("k1")).unwrap();
        assert_eq!(json["hostIp"], "10.0.0.5:22");
        assert_eq!(json["username"], "bob");
        assert_eq!(json["key"], "k1");
    }

    #[test]
    fn display_label() {
        assert_eq!(descriptor("k").display_label(), "bob@10.0.0.5:22");
    }
}
