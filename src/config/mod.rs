//! Client configuration
//!
//! Immutable for the engine's lifetime. The structure is deserializable
//! so hosts can embed it in their own configuration files; loading and
//! merging stay in the host.

use serde::Deserialize;

use crate::protocol::ClientError;

#[cfg(test)]
mod tests;

/// MQTT client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Client identifier; must be non-empty
    pub client_id: String,
    /// Optional username
    pub username: Option<String>,
    /// Optional password
    pub password: Option<String>,
    /// Keep-alive interval in seconds (0 disables the keep-alive timer)
    pub keep_alive: u16,
    /// Clean session flag
    pub clean_session: bool,
    /// Advisory packet timeout in milliseconds; the engine does not act
    /// on it, hosts may use it to bound their own ack waits
    pub packet_timeout: u16,
    /// Reserved; no effect in the QoS 0 core
    pub max_retry_count: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            username: None,
            password: None,
            keep_alive: 60,
            clean_session: true,
            packet_timeout: 5000,
            max_retry_count: 3,
        }
    }
}

impl ClientConfig {
    /// Configuration with the given client id and default settings
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.client_id.is_empty() {
            return Err(ClientError::InvalidInput("client_id must not be empty"));
        }
        Ok(())
    }
}
