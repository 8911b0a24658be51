//! # Relay client
//!
//! Builds memo carrying deposits for a cross chain liquidity protocol and dispatches them
//! through a deposit function supplied by the host application.
//!
//! [`adapter::ProtocolAdapter`] is the entry point. It depends on an
//! [`rpc::InboundDataClient`] for inbound routes and halt switches (an HTTP implementation is
//! provided by [`rpc::HttpInboundClient`]) and on the host's
//! [`relay_common::traits::DepositHandler`] and wallets.
pub mod adapter;
pub mod config;
pub mod rpc;

pub use adapter::{AdapterError, ProtocolAdapter};
pub use config::{AdapterConfig, HttpClientOptions};
pub use rpc::{HttpInboundClient, InboundDataClient, RPCError};
