//! # Ledger Fixtures
//!
//! A small ledger laid out on a fixed grid: record file `i` spans
//! `[i * BLOCK_SPAN, (i + 1) * BLOCK_SPAN - 1]` and the first balance
//! snapshot sits in the middle of block 1, so block 1 is genesis.

use ledger_reconstruction::test_utils::{entity, id, record_file};
use ledger_reconstruction::{CodeBook, InMemoryLedgerStore, LedgerConfig, LedgerService};
use shared_types::Timestamp;
use std::sync::Arc;

pub const BLOCK_SPAN: Timestamp = 1_000;

pub const GENESIS_SNAPSHOT: Timestamp = BLOCK_SPAN + BLOCK_SPAN / 2;

/// Builder over an in-memory store.
pub struct LedgerFixture {
    pub store: Arc<InMemoryLedgerStore>,
    blocks: i64,
}

impl LedgerFixture {
    /// `blocks` record files, starting at index 0.
    pub fn new(blocks: i64) -> Self {
        let store = Arc::new(InMemoryLedgerStore::new());
        for index in 0..blocks {
            let start = index * BLOCK_SPAN;
            store.insert_record_file(record_file(index, start, start + BLOCK_SPAN - 1));
        }
        store.insert_snapshot(GENESIS_SNAPSHOT);
        Self { store, blocks }
    }

    /// Register accounts with their balances in the genesis snapshot.
    pub fn with_accounts(self, accounts: &[(i64, i64)]) -> Self {
        for &(account, balance) in accounts {
            self.store.insert_entity(entity(account));
            self.store
                .set_snapshot_hbar(GENESIS_SNAPSHOT, id(account), balance);
        }
        self
    }

    /// Last consensus timestamp covered by the record files.
    pub fn end(&self) -> Timestamp {
        self.blocks * BLOCK_SPAN - 1
    }

    pub fn service(&self) -> LedgerService<InMemoryLedgerStore> {
        self.service_with(LedgerConfig::default())
    }

    pub fn service_with(&self, config: LedgerConfig) -> LedgerService<InMemoryLedgerStore> {
        match LedgerService::new(self.store.clone(), config, CodeBook::default()) {
            Ok(service) => service,
            Err(err) => panic!("fixture config rejected: {}", err),
        }
    }
}
