//! # Ports Layer
//!
//! - `inbound.rs` - Driving ports (the query API)
//! - `outbound.rs` - Driven ports (read access to the ledger store)

pub mod inbound;
pub mod outbound;
