//! MQTT Packet Encoder
//!
//! Serializers for the packets a v3.1.1 client sends. Each function
//! computes the remaining length up front, then writes the fixed header
//! followed by the variable header and payload into the caller's buffer.

use bytes::{BufMut, BytesMut};

use super::{write_binary, write_str, write_variable_int};
use crate::config::ClientConfig;
use crate::protocol::{EncodeError, Message, PacketType, QoS};

/// Encode a CONNECT packet from the client configuration
pub fn encode_connect(config: &ClientConfig, buf: &mut BytesMut) -> Result<(), EncodeError> {
    if config.client_id.is_empty() {
        return Err(EncodeError::InvalidClientId);
    }

    // Protocol name (6) + level (1) + connect flags (1) + keep alive (2)
    let mut remaining_length = 10;
    remaining_length += 2 + config.client_id.len();
    if let Some(ref username) = config.username {
        remaining_length += 2 + username.len();
    }
    if let Some(ref password) = config.password {
        remaining_length += 2 + password.len();
    }

    // Fixed header
    buf.put_u8((PacketType::Connect as u8) << 4);
    write_variable_int(buf, remaining_length as u32)?;

    // Protocol name "MQTT" and protocol level 4
    write_str(buf, "MQTT")?;
    buf.put_u8(0x04);

    // Connect flags
    let mut connect_flags: u8 = 0;
    if config.clean_session {
        connect_flags |= 0x02;
    }
    if config.password.is_some() {
        connect_flags |= 0x40;
    }
    if config.username.is_some() {
        connect_flags |= 0x80;
    }
    buf.put_u8(connect_flags);

    // Keep alive
    buf.put_u16(config.keep_alive);

    // Payload: client id, then username and password if flagged
    write_str(buf, &config.client_id)?;
    if let Some(ref username) = config.username {
        write_str(buf, username)?;
    }
    if let Some(ref password) = config.password {
        write_binary(buf, password.as_bytes())?;
    }

    Ok(())
}

/// Encode a PUBLISH packet
pub fn encode_publish(message: &Message<'_>, buf: &mut BytesMut) -> Result<(), EncodeError> {
    if message.topic.is_empty() {
        return Err(EncodeError::InvalidTopicName);
    }

    let mut remaining_length = 2 + message.topic.len();
    if message.qos != QoS::AtMostOnce {
        remaining_length += 2;
    }
    remaining_length += message.payload.len();

    // Fixed header: retain bit 0, QoS bits 1-2, dup bit 3 (never set)
    let mut first_byte = (PacketType::Publish as u8) << 4;
    first_byte |= (message.qos as u8) << 1;
    if message.retain {
        first_byte |= 0x01;
    }
    buf.put_u8(first_byte);
    write_variable_int(buf, remaining_length as u32)?;

    write_str(buf, message.topic)?;
    if message.qos != QoS::AtMostOnce {
        buf.put_u16(message.packet_id);
    }
    buf.put_slice(message.payload);

    Ok(())
}

/// Encode a SUBSCRIBE packet
///
/// `filters` and `qos` must be the same length; the caller validates.
pub fn encode_subscribe(
    filters: &[&str],
    qos: &[QoS],
    packet_id: u16,
    buf: &mut BytesMut,
) -> Result<(), EncodeError> {
    let mut remaining_length = 2;
    for filter in filters {
        if filter.is_empty() {
            return Err(EncodeError::InvalidTopicName);
        }
        remaining_length += 2 + filter.len() + 1;
    }

    // Fixed header flags are the reserved 0010 pattern
    buf.put_u8(((PacketType::Subscribe as u8) << 4) | 0x02);
    write_variable_int(buf, remaining_length as u32)?;

    buf.put_u16(packet_id);

    for (filter, q) in filters.iter().zip(qos) {
        write_str(buf, filter)?;
        buf.put_u8(*q as u8);
    }

    Ok(())
}

/// Encode an UNSUBSCRIBE packet
pub fn encode_unsubscribe(
    filters: &[&str],
    packet_id: u16,
    buf: &mut BytesMut,
) -> Result<(), EncodeError> {
    let mut remaining_length = 2;
    for filter in filters {
        if filter.is_empty() {
            return Err(EncodeError::InvalidTopicName);
        }
        remaining_length += 2 + filter.len();
    }

    // Fixed header flags are the reserved 0010 pattern
    buf.put_u8(((PacketType::Unsubscribe as u8) << 4) | 0x02);
    write_variable_int(buf, remaining_length as u32)?;

    buf.put_u16(packet_id);

    for filter in filters {
        write_str(buf, filter)?;
    }

    Ok(())
}

/// Encode a PINGREQ packet
pub fn encode_pingreq(buf: &mut BytesMut) {
    buf.put_u8((PacketType::PingReq as u8) << 4);
    buf.put_u8(0x00);
}

/// Encode a DISCONNECT packet
pub fn encode_disconnect(buf: &mut BytesMut) {
    buf.put_u8((PacketType::Disconnect as u8) << 4);
    buf.put_u8(0x00);
}
