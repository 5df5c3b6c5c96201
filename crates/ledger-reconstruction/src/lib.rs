//! # Ledger Reconstruction Engine
//!
//! Answers point-in-time questions about an account-model ledger from its
//! append-only relational history: which block covers a timestamp, what an
//! account held at a moment, and which balance-changing operations a
//! transaction performed.
//!
//! ## Reconstruction Model
//!
//! ```text
//! balance(account, t) = snapshot(account, s) + Σ deltas(account, s < ts <= t)
//!                       where s = latest snapshot timestamp <= t
//! ```
//!
//! Nothing is precomputed or written back; every answer is derived per
//! request from committed rows.
//!
//! ## Guarantees
//!
//! | Area | Guarantee |
//! |------|-----------|
//! | Genesis | First block ending after the first snapshot; self-referential parent |
//! | Errata | Retracted transfers never count, inserted ones always do |
//! | Deletion | A deleted account's balance is frozen at its deletion |
//! | Dissociation | Tokens dissociated after the snapshot report an explicit zero |
//! | Operations | Indices contiguous from zero across rows sharing a hash |
//! | Deadlines | Every store call bounded by the request deadline and statement timeout |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure reconstruction logic over rows
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `adapters/` - In-memory store and the deadline-bound store scope
//! - `service/` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use ledger_reconstruction::{
//!     CodeBook, InMemoryLedgerStore, LedgerApi, LedgerConfig, LedgerService, RequestContext,
//! };
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryLedgerStore::new());
//! let service = LedgerService::new(store, LedgerConfig::from_env()?, CodeBook::default())?;
//!
//! let ctx = RequestContext::background();
//! let block = service.resolve_block(&ctx, BlockSelector::Latest).await?;
//! let balance = service.get_balance(&ctx, &"0.0.1001".parse()?, block.consensus_end).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::{InMemoryLedgerStore, StoreScope};
pub use domain::codes::CodeBook;
pub use domain::rows::*;
pub use domain::value_objects::{ConfigError, LedgerConfig};
pub use ports::inbound::{AccountSelector, BlockSelector, LedgerApi, RequestContext};
pub use ports::outbound::{
    AddressBookStore, AliasDirectory, BalanceStore, BlockStore, LedgerStore, StoreError,
    TransactionStore,
};
pub use service::{
    AddressBookResolver, BalanceReconstructor, BlockIndexer, GenesisResolver, LedgerService,
    OperationBuilder,
};
