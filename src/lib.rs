//! WispMQ - Transport-agnostic MQTT v3.1.1 client protocol engine
//!
//! A pure, event-driven packet codec and connection state machine.
//! The engine owns no socket and spawns no thread: the host feeds it
//! incoming bytes and elapsed-time ticks, and receives outgoing bytes
//! through a send sink plus semantic events through handler callbacks.

pub mod assembler;
pub mod client;
pub mod codec;
pub mod config;
pub mod handler;
pub mod protocol;
pub mod session;

pub use assembler::Assembler;
pub use client::Client;
pub use config::ClientConfig;
pub use handler::EventHandler;
pub use protocol::{
    ClientError, ConnectReturnCode, DecodeError, EncodeError, Message, QoS, SubscribeReturnCode,
};
pub use session::ConnectionState;
