//! Inbound adapters translating external requests into driving-port calls.
//!
//! HTTP handlers live under [`http`].

pub mod http;
