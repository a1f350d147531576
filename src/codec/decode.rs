//! MQTT Packet Decoder
//!
//! Framing probe plus parsers for the packets a v3.1.1 client receives.
//! `decode` is only invoked on whole-packet slices confirmed by the
//! assembler via `expected_packet_len`.

use smallvec::SmallVec;

use super::{read_str, read_variable_int};
use crate::protocol::{
    ConnAck, ConnectReturnCode, DecodeError, Message, Packet, PacketType, QoS, SubAck,
    SubscribeReturnCode, MAX_SUBACK_CODES,
};

/// Total length of the next packet in `buf`, or `None` when more data
/// is needed.
///
/// A remaining length whose encoding would need a fifth byte is also
/// reported as `None`: the stream stalls rather than desynchronizes,
/// and the host recovers via `disconnect()`.
pub fn expected_packet_len(buf: &[u8]) -> Option<usize> {
    if buf.len() < 2 {
        return None;
    }
    match read_variable_int(&buf[1..]) {
        Ok((remaining, len_bytes)) => Some(1 + len_bytes + remaining as usize),
        Err(_) => None,
    }
}

/// Decode one whole packet
pub fn decode(frame: &[u8]) -> Result<Packet<'_>, DecodeError> {
    if frame.len() < 2 {
        return Err(DecodeError::InsufficientData);
    }

    let first_byte = frame[0];
    let flags = first_byte & 0x0F;
    let (remaining, len_bytes) = read_variable_int(&frame[1..])?;

    let payload_start = 1 + len_bytes;
    let total_len = payload_start + remaining as usize;
    if frame.len() < total_len {
        return Err(DecodeError::InsufficientData);
    }
    let payload = &frame[payload_start..total_len];

    match PacketType::from_u8(first_byte >> 4) {
        Some(PacketType::ConnAck) => decode_connack(payload),
        Some(PacketType::Publish) => decode_publish(flags, payload),
        Some(PacketType::PubAck) => {
            decode_packet_id(payload).map(|packet_id| Packet::PubAck { packet_id })
        }
        Some(PacketType::SubAck) => decode_suback(payload),
        Some(PacketType::UnsubAck) => {
            decode_packet_id(payload).map(|packet_id| Packet::UnsubAck { packet_id })
        }
        Some(PacketType::PingResp) => Ok(Packet::PingResp),
        Some(PacketType::Disconnect) => Ok(Packet::Disconnect),
        _ => Err(DecodeError::InvalidPacketType(first_byte >> 4)),
    }
}

fn decode_connack(payload: &[u8]) -> Result<Packet<'static>, DecodeError> {
    if payload.len() < 2 {
        return Err(DecodeError::InsufficientData);
    }

    let session_present = (payload[0] & 0x01) != 0;
    let return_code = ConnectReturnCode::from_u8(payload[1]);

    Ok(Packet::ConnAck(ConnAck {
        session_present,
        return_code,
    }))
}

fn decode_publish(flags: u8, payload: &[u8]) -> Result<Packet<'_>, DecodeError> {
    let retain = (flags & 0x01) != 0;
    let qos_bits = (flags >> 1) & 0x03;
    let qos = QoS::from_u8(qos_bits).ok_or(DecodeError::InvalidQoS(qos_bits))?;

    let mut pos = 0;

    let (topic, len) = read_str(&payload[pos..])?;
    pos += len;

    // Packet id is only present above QoS 0
    let packet_id = if qos != QoS::AtMostOnce {
        if pos + 2 > payload.len() {
            return Err(DecodeError::InsufficientData);
        }
        let id = u16::from_be_bytes([payload[pos], payload[pos + 1]]);
        pos += 2;
        id
    } else {
        0
    };

    Ok(Packet::Publish(Message {
        topic,
        payload: &payload[pos..],
        qos,
        retain,
        packet_id,
    }))
}

fn decode_packet_id(payload: &[u8]) -> Result<u16, DecodeError> {
    if payload.len() < 2 {
        return Err(DecodeError::InsufficientData);
    }
    Ok(u16::from_be_bytes([payload[0], payload[1]]))
}

fn decode_suback(payload: &[u8]) -> Result<Packet<'static>, DecodeError> {
    if payload.len() < 3 {
        return Err(DecodeError::InsufficientData);
    }

    let packet_id = u16::from_be_bytes([payload[0], payload[1]]);

    let codes = &payload[2..];
    if codes.len() > MAX_SUBACK_CODES {
        return Err(DecodeError::MalformedPacket("too many SUBACK return codes"));
    }

    let mut return_codes = SmallVec::new();
    for &code in codes {
        return_codes
            .push(SubscribeReturnCode::from_u8(code).ok_or(DecodeError::InvalidReturnCode(code))?);
    }

    Ok(Packet::SubAck(SubAck {
        packet_id,
        return_codes,
    }))
}
