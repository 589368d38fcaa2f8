//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: process-local repositories for development and tests
//! - **credentials**: salted password digests
//!
//! Adapters translate between domain types and storage representations and
//! hold no lending rules.

pub mod credentials;
pub mod memory;
pub mod persistence;
