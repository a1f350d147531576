//! Client engine facade
//!
//! Composes the codec, the stream assembler, and the session state
//! machine behind the public operations. The engine is passive: it owns
//! no socket and no thread, performs all work in the calling thread, and
//! reaches the outside world only through the caller's
//! [`EventHandler`].
//!
//! A single mutex guards the session counters and the reassembly
//! buffer. It is never held across a handler invocation or a send-sink
//! call: every dispatch works on data moved out of the critical
//! section.

use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::assembler::Assembler;
use crate::codec;
use crate::config::ClientConfig;
use crate::handler::EventHandler;
use crate::protocol::{ClientError, ConnectReturnCode, Message, Packet, QoS};
use crate::session::{ConnectionState, Session, MAX_MISSED_PINGRESP};


/// MQTT 3.1.1 client protocol engine
pub struct Client {
    config: ClientConfig,
    handler: Box<dyn EventHandler>,
    inner: Mutex<Inner>,
}

struct Inner {
    session: Session,
    assembler: Assembler,
}

/// Deferred work decided under the lock during a timer tick
enum TimerAction {
    None,
    SendPingReq,
    Escalate,
}

impl Client {
    /// Create an engine from a configuration and a handler set.
    pub fn new<H>(config: ClientConfig, handler: H) -> Result<Self, ClientError>
    where
        H: EventHandler + 'static,
    {
        config.validate()?;

        Ok(Self {
            config,
            handler: Box::new(handler),
            inner: Mutex::new(Inner {
                session: Session::new(),
                assembler: Assembler::new(),
            }),
        })
    }

    /// Send CONNECT and enter Connecting.
    ///
    /// Valid only from Disconnected.
    pub fn connect(&self) -> Result<(), ClientError> {
        {
            let inner = self.inner.lock();
            if inner.session.state != ConnectionState::Disconnected {
                return Err(ClientError::InvalidState(inner.session.state));
            }
        }

        let mut buf = BytesMut::with_capacity(64 + self.config.client_id.len());
        codec::encode_connect(&self.config, &mut buf)?;
        self.send_all(&buf)?;

        debug!(client_id = %self.config.client_id, "CONNECT sent");
        self.inner.lock().session.begin_connect();
        Ok(())
    }

    /// Best-effort DISCONNECT, then drop to Disconnected and clear any
    /// partially reassembled input.
    ///
    /// Valid from any state except Disconnected.
    pub fn disconnect(&self) -> Result<(), ClientError> {
        {
            let inner = self.inner.lock();
            if inner.session.state == ConnectionState::Disconnected {
                return Err(ClientError::InvalidState(inner.session.state));
            }
        }

        let mut buf = BytesMut::with_capacity(2);
        codec::encode_disconnect(&mut buf);
        if self.handler.send(&buf).is_err() {
            trace!("DISCONNECT send failed during teardown");
        }

        {
            let mut inner = self.inner.lock();
            inner.session.state = ConnectionState::Disconnected;
            inner.assembler.clear();
        }

        debug!(client_id = %self.config.client_id, "disconnected");
        self.handler
            .on_connection(false, ConnectReturnCode::Accepted);
        Ok(())
    }

    /// Publish a QoS 0 message.
    pub fn publish(&self, message: &Message<'_>) -> Result<(), ClientError> {
        if message.qos != QoS::AtMostOnce {
            return Err(ClientError::InvalidInput("only QoS 0 publish is supported"));
        }
        self.check_connected()?;

        let mut buf =
            BytesMut::with_capacity(1 + 4 + 2 + message.topic.len() + message.payload.len());
        codec::encode_publish(message, &mut buf)?;
        self.send_all(&buf)?;

        trace!(topic = %message.topic, len = message.payload.len(), "PUBLISH sent");
        Ok(())
    }

    /// Subscribe to one or more topic filters, all at QoS 0.
    pub fn subscribe(&self, filters: &[&str], qos: &[QoS]) -> Result<(), ClientError> {
        if filters.is_empty() {
            return Err(ClientError::InvalidInput("no topic filters"));
        }
        if filters.len() != qos.len() {
            return Err(ClientError::InvalidInput("filter and QoS counts differ"));
        }
        if qos.iter().any(|q| *q != QoS::AtMostOnce) {
            return Err(ClientError::InvalidInput(
                "only QoS 0 subscriptions are supported",
            ));
        }
        self.check_connected()?;

        let packet_id = self.next_packet_id();
        let mut buf = BytesMut::with_capacity(
            8 + filters.iter().map(|f| f.len() + 3).sum::<usize>(),
        );
        codec::encode_subscribe(filters, qos, packet_id, &mut buf)?;
        self.send_all(&buf)?;

        debug!(packet_id, count = filters.len(), "SUBSCRIBE sent");
        Ok(())
    }

    /// Unsubscribe from one or more topic filters.
    pub fn unsubscribe(&self, filters: &[&str]) -> Result<(), ClientError> {
        if filters.is_empty() {
            return Err(ClientError::InvalidInput("no topic filters"));
        }
        self.check_connected()?;

        let packet_id = self.next_packet_id();
        let mut buf = BytesMut::with_capacity(
            8 + filters.iter().map(|f| f.len() + 2).sum::<usize>(),
        );
        codec::encode_unsubscribe(filters, packet_id, &mut buf)?;
        self.send_all(&buf)?;

        debug!(packet_id, count = filters.len(), "UNSUBSCRIBE sent");
        Ok(())
    }

    /// Feed bytes read from the transport.
    ///
    /// Complete packets are dispatched to the handlers in stream order;
    /// trailing partial bytes are retained for the next call. Always
    /// reports the full slice as consumed.
    pub fn input(&self, data: &[u8]) -> Result<usize, ClientError> {
        if data.is_empty() {
            return Err(ClientError::InvalidInput("empty input"));
        }

        self.inner.lock().assembler.feed(data);

        loop {
            let frame = {
                let mut inner = self.inner.lock();
                inner.assembler.next_frame()
            };
            match frame {
                Some(frame) => self.dispatch(&frame),
                None => break,
            }
        }

        Ok(data.len())
    }

    /// Report elapsed time and drive the keep-alive machinery.
    ///
    /// When the keep-alive deadline passes, emits a PINGREQ; when it
    /// passes again with the previous PINGREQ unanswered, counts a
    /// missed heartbeat, forcing a disconnect on the third miss.
    pub fn timer(&self, elapsed_ms: u32) -> Result<(), ClientError> {
        let action = {
            let mut inner = self.inner.lock();
            let session = &mut inner.session;

            if session.state != ConnectionState::Connected || self.config.keep_alive == 0 {
                return Ok(());
            }

            session.keep_alive_accum = session.keep_alive_accum.saturating_add(elapsed_ms);
            let deadline_ms = u32::from(self.config.keep_alive) * 1000;

            if session.keep_alive_accum < deadline_ms {
                TimerAction::None
            } else if !session.awaiting_pingresp {
                session.awaiting_pingresp = true;
                session.keep_alive_accum = 0;
                TimerAction::SendPingReq
            } else {
                // The accumulator is deliberately left past the deadline:
                // every further due tick counts another miss.
                session.missed_pingresp += 1;
                if session.missed_pingresp >= MAX_MISSED_PINGRESP {
                    session.state = ConnectionState::Disconnected;
                    TimerAction::Escalate
                } else {
                    TimerAction::None
                }
            }
        };

        match action {
            TimerAction::None => {}
            TimerAction::SendPingReq => {
                let mut buf = BytesMut::with_capacity(2);
                codec::encode_pingreq(&mut buf);
                match self.handler.send(&buf) {
                    Ok(n) if n == buf.len() => trace!("PINGREQ sent"),
                    _ => warn!("PINGREQ send failed"),
                }
            }
            TimerAction::Escalate => {
                warn!(
                    missed = MAX_MISSED_PINGRESP,
                    "keep-alive expired without PINGRESP, forcing disconnect"
                );
                self.handler
                    .on_connection(false, ConnectReturnCode::RefusedServerUnavailable);
            }
        }

        Ok(())
    }

    /// Current connection state; the ground truth behind the
    /// connection-changed events.
    pub fn state(&self) -> ConnectionState {
        self.inner.lock().session.state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Allocate the next packet identifier (1..=65535, wrapping).
    pub fn next_packet_id(&self) -> u16 {
        self.inner.lock().session.next_packet_id()
    }

    fn check_connected(&self) -> Result<(), ClientError> {
        let state = self.state();
        if state != ConnectionState::Connected {
            return Err(ClientError::InvalidState(state));
        }
        Ok(())
    }

    fn send_all(&self, data: &[u8]) -> Result<(), ClientError> {
        match self.handler.send(data) {
            Ok(n) if n == data.len() => Ok(()),
            _ => Err(ClientError::Transport),
        }
    }

    /// Parse one whole packet and route it. Undecodable packets are
    /// dropped; their bytes are already consumed.
    fn dispatch(&self, frame: &[u8]) {
        let packet = match codec::decode(frame) {
            Ok(packet) => packet,
            Err(e) => {
                trace!(error = %e, "dropping undecodable packet");
                return;
            }
        };

        match packet {
            Packet::ConnAck(ack) => {
                if ack.return_code == ConnectReturnCode::Accepted {
                    {
                        let mut inner = self.inner.lock();
                        inner.session.state = ConnectionState::Connected;
                        inner.session.missed_pingresp = 0;
                    }
                    debug!(session_present = ack.session_present, "connection accepted");
                    self.handler.on_connection(true, ConnectReturnCode::Accepted);
                } else {
                    self.inner.lock().session.state = ConnectionState::Disconnected;
                    debug!(code = ?ack.return_code, "connection refused");
                    self.handler.on_connection(false, ack.return_code);
                }
            }
            Packet::Publish(message) => {
                trace!(topic = %message.topic, len = message.payload.len(), "PUBLISH received");
                self.handler.on_message(&message);
            }
            Packet::PubAck { packet_id } => {
                self.handler.on_publish_ack(packet_id);
            }
            Packet::SubAck(ack) => {
                self.handler
                    .on_subscribe_ack(ack.packet_id, &ack.return_codes);
            }
            Packet::UnsubAck { packet_id } => {
                self.handler.on_unsubscribe_ack(packet_id);
            }
            Packet::PingResp => {
                self.inner.lock().session.record_pingresp();
                trace!("PINGRESP received");
            }
            Packet::Disconnect => {
                self.inner.lock().session.state = ConnectionState::Disconnected;
                debug!("server-initiated DISCONNECT");
                self.handler
                    .on_connection(false, ConnectReturnCode::Accepted);
            }
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if self.inner.get_mut().session.state != ConnectionState::Disconnected {
            let _ = self.disconnect();
        }
    }
}
