//! # Adapters Layer
//!
//! - `memory` - In-memory implementation of every outbound port
//! - `scope` - Deadline-bound store handle used by the service

pub mod memory;
pub mod scope;

pub use memory::InMemoryLedgerStore;
pub use scope::StoreScope;
