//! Event handler contract
//!
//! The engine's only outward surface. Implement this trait to receive
//! outbound bytes and semantic events; every method except `send` has a
//! default no-op implementation. The engine never invokes a handler
//! while holding its internal lock, so handler implementations may call
//! back into the client.

use std::io;
use std::sync::Arc;

use crate::protocol::{ConnectReturnCode, Message, SubscribeReturnCode};

/// Client event sinks
///
/// Handlers take `&self`; implementations that need mutable state use
/// interior mutability. All methods may be invoked from whichever host
/// thread drives the corresponding engine entry point.
pub trait EventHandler: Send + Sync {
    /// Push outbound bytes to the transport.
    ///
    /// Returning `Ok(n)` with `n != data.len()`, or any error, is a
    /// transport failure: the engine aborts the current outbound
    /// operation with [`ClientError::Transport`](crate::ClientError).
    fn send(&self, data: &[u8]) -> io::Result<usize>;

    /// Connection established or lost.
    ///
    /// `return_code` carries the CONNACK refusal on a failed connect,
    /// [`RefusedServerUnavailable`](ConnectReturnCode) on a missed-ping
    /// escalation, and [`Accepted`](ConnectReturnCode) on a clean
    /// disconnect.
    fn on_connection(&self, _connected: bool, _return_code: ConnectReturnCode) {}

    /// Application message received.
    ///
    /// The message borrows from the engine's receive buffer and is valid
    /// only for the duration of the call.
    fn on_message(&self, _message: &Message<'_>) {}

    /// PUBACK received
    fn on_publish_ack(&self, _packet_id: u16) {}

    /// SUBACK received
    fn on_subscribe_ack(&self, _packet_id: u16, _return_codes: &[SubscribeReturnCode]) {}

    /// UNSUBACK received
    fn on_unsubscribe_ack(&self, _packet_id: u16) {}
}

/// Implement EventHandler for Arc<T> where T: EventHandler
/// This allows Arc-wrapped handlers to be used directly
impl<T: EventHandler + ?Sized> EventHandler for Arc<T> {
    fn send(&self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn on_connection(&self, connected: bool, return_code: ConnectReturnCode) {
        (**self).on_connection(connected, return_code);
    }

    fn on_message(&self, message: &Message<'_>) {
        (**self).on_message(message);
    }

    fn on_publish_ack(&self, packet_id: u16) {
        (**self).on_publish_ack(packet_id);
    }

    fn on_subscribe_ack(&self, packet_id: u16, return_codes: &[SubscribeReturnCode]) {
        (**self).on_subscribe_ack(packet_id, return_codes);
    }

    fn on_unsubscribe_ack(&self, packet_id: u16) {
        (**self).on_unsubscribe_ack(packet_id);
    }
}
