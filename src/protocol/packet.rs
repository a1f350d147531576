//! MQTT Packet Definitions
//!
//! Inbound packet model for the client engine. Packets borrow from the
//! decoded frame: the engine never holds them past the dispatch of the
//! matching callback.

use smallvec::SmallVec;

use super::{ConnectReturnCode, QoS, SubscribeReturnCode};

/// Maximum number of SUBACK return codes the client accepts
pub const MAX_SUBACK_CODES: usize = 16;

/// Inbound MQTT packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet<'a> {
    ConnAck(ConnAck),
    Publish(Message<'a>),
    PubAck { packet_id: u16 },
    SubAck(SubAck),
    UnsubAck { packet_id: u16 },
    PingResp,
    Disconnect,
}

/// CONNACK packet (server -> client)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnAck {
    /// Session present flag
    pub session_present: bool,
    /// Connection return code
    pub return_code: ConnectReturnCode,
}

/// An application message, as published by the host or received from
/// the broker.
///
/// For inbound messages the topic and payload borrow from the engine's
/// decoded frame and are valid only for the duration of the
/// [`on_message`](crate::EventHandler::on_message) callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'a> {
    /// Topic name
    pub topic: &'a str,
    /// Message payload
    pub payload: &'a [u8],
    /// Quality of service
    pub qos: QoS,
    /// Retain flag
    pub retain: bool,
    /// Packet identifier (0 for QoS 0)
    pub packet_id: u16,
}

impl<'a> Message<'a> {
    /// A QoS 0, non-retained message
    pub fn new(topic: &'a str, payload: &'a [u8]) -> Self {
        Self {
            topic,
            payload,
            qos: QoS::AtMostOnce,
            retain: false,
            packet_id: 0,
        }
    }
}

/// SUBACK packet (server -> client)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAck {
    /// Packet identifier
    pub packet_id: u16,
    /// Return code per requested subscription
    pub return_codes: SmallVec<[SubscribeReturnCode; MAX_SUBACK_CODES]>,
}
