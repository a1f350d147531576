//! MQTT Protocol definitions and types
//!
//! Defines the core v3.1.1 protocol types shared by the codec and the
//! client state machine.

mod error;
mod packet;

pub use error::{ClientError, DecodeError, EncodeError};
pub use packet::{ConnAck, Message, Packet, SubAck, MAX_SUBACK_CODES};

use serde::Deserialize;

/// Quality of Service levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[repr(u8)]
pub enum QoS {
    /// At most once delivery
    #[default]
    AtMostOnce = 0,
    /// At least once delivery
    AtLeastOnce = 1,
    /// Exactly once delivery
    ExactlyOnce = 2,
}

impl QoS {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            2 => Some(QoS::ExactlyOnce),
            _ => None,
        }
    }
}

/// MQTT Packet Type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    ConnAck = 2,
    Publish = 3,
    PubAck = 4,
    PubRec = 5,
    PubRel = 6,
    PubComp = 7,
    Subscribe = 8,
    SubAck = 9,
    Unsubscribe = 10,
    UnsubAck = 11,
    PingReq = 12,
    PingResp = 13,
    Disconnect = 14,
}

impl PacketType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(PacketType::Connect),
            2 => Some(PacketType::ConnAck),
            3 => Some(PacketType::Publish),
            4 => Some(PacketType::PubAck),
            5 => Some(PacketType::PubRec),
            6 => Some(PacketType::PubRel),
            7 => Some(PacketType::PubComp),
            8 => Some(PacketType::Subscribe),
            9 => Some(PacketType::SubAck),
            10 => Some(PacketType::Unsubscribe),
            11 => Some(PacketType::UnsubAck),
            12 => Some(PacketType::PingReq),
            13 => Some(PacketType::PingResp),
            14 => Some(PacketType::Disconnect),
            _ => None,
        }
    }
}

/// CONNACK return codes (v3.1.1 §3.2.2.3)
///
/// `Accepted` doubles as the "clean disconnect" sentinel in
/// connection-changed events, matching its zero wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectReturnCode {
    /// Connection accepted
    Accepted = 0,
    /// Unacceptable protocol version
    RefusedProtocolVersion = 1,
    /// Client identifier rejected
    RefusedIdentifierRejected = 2,
    /// Server unavailable
    RefusedServerUnavailable = 3,
    /// Bad username or password
    RefusedBadCredentials = 4,
    /// Not authorized
    RefusedNotAuthorized = 5,
    /// Any return code outside the defined 0..=5 range
    RefusedOther = 255,
}

impl ConnectReturnCode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => ConnectReturnCode::Accepted,
            1 => ConnectReturnCode::RefusedProtocolVersion,
            2 => ConnectReturnCode::RefusedIdentifierRejected,
            3 => ConnectReturnCode::RefusedServerUnavailable,
            4 => ConnectReturnCode::RefusedBadCredentials,
            5 => ConnectReturnCode::RefusedNotAuthorized,
            _ => ConnectReturnCode::RefusedOther,
        }
    }
}

/// SUBACK return codes (v3.1.1 §3.9.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SubscribeReturnCode {
    /// Success, maximum QoS 0
    GrantedQoS0 = 0x00,
    /// Success, maximum QoS 1
    GrantedQoS1 = 0x01,
    /// Success, maximum QoS 2
    GrantedQoS2 = 0x02,
    /// Subscription refused
    Failure = 0x80,
}

impl SubscribeReturnCode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x00 => Some(SubscribeReturnCode::GrantedQoS0),
            0x01 => Some(SubscribeReturnCode::GrantedQoS1),
            0x02 => Some(SubscribeReturnCode::GrantedQoS2),
            0x80 => Some(SubscribeReturnCode::Failure),
            _ => None,
        }
    }
}
