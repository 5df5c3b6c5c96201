//! # Ledger Service
//!
//! The service implementing [`LedgerApi`].
//!
//! ## Architecture
//!
//! This service:
//! 1. Opens one deadline-bound store scope per request
//! 2. Delegates to the block indexer, balance reconstructor, operation
//!    builder and address book resolver
//! 3. Records every query in the engine metrics
//!
//! The store is injected; nothing here knows which database sits behind it.

mod address_book;
mod balances;
mod blocks;
mod transactions;

pub use address_book::AddressBookResolver;
pub use balances::BalanceReconstructor;
pub use blocks::{BlockIndexer, GenesisResolver};
pub use transactions::OperationBuilder;

use async_trait::async_trait;
use mirror_telemetry::QueryTimer;
use shared_types::{
    AccountBalance, AddressBookEntry, Block, LedgerError, Timestamp, Transaction,
};
use std::future::Future;
use std::sync::Arc;

use crate::adapters::scope::StoreScope;
use crate::domain::codes::CodeBook;
use crate::domain::operations::OperationAssembler;
use crate::domain::value_objects::{ConfigError, LedgerConfig};
use crate::ports::inbound::{AccountSelector, BlockSelector, LedgerApi, RequestContext};
use crate::ports::outbound::LedgerStore;

/// The ledger reconstruction service.
pub struct LedgerService<S: LedgerStore + ?Sized> {
    store: Arc<S>,
    config: LedgerConfig,
    blocks: BlockIndexer,
    balances: BalanceReconstructor,
    operations: OperationBuilder,
    address_book: AddressBookResolver,
}

impl<S: LedgerStore + ?Sized> LedgerService<S> {
    /// Create the service over `store`. The configuration is validated first.
    pub fn new(store: Arc<S>, config: LedgerConfig, codes: CodeBook) -> Result<Self, ConfigError> {
        config.validate()?;

        let assembler = OperationAssembler::new(Arc::new(codes), config.staking_reward_account);
        Ok(Self {
            store,
            blocks: BlockIndexer::new(),
            balances: BalanceReconstructor::new(),
            operations: OperationBuilder::new(assembler, config.batch_size),
            address_book: AddressBookResolver::new(
                config.address_book_file,
                config.address_book_fallback_file,
            ),
            config,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The genesis block, if it has been resolved already.
    pub fn cached_genesis(&self) -> Option<&Block> {
        self.blocks.genesis().cached()
    }

    fn scope(&self, ctx: &RequestContext) -> StoreScope<'_, S> {
        StoreScope::open(self.store.as_ref(), ctx, self.config.statement_timeout())
    }
}

/// Await `query`, recording its latency and outcome under `operation`.
async fn observed<T>(
    operation: &'static str,
    query: impl Future<Output = Result<T, LedgerError>>,
) -> Result<T, LedgerError> {
    let timer = QueryTimer::start(operation);
    let result = query.await;
    timer.finish(result.as_ref().err().map(|e| e.kind().as_str()));
    result
}

#[async_trait]
impl<S: LedgerStore + ?Sized> LedgerApi for LedgerService<S> {
    async fn resolve_block(
        &self,
        ctx: &RequestContext,
        selector: BlockSelector,
    ) -> Result<Block, LedgerError> {
        observed("resolve_block", async {
            let scope = self.scope(ctx);
            self.blocks.resolve(&scope, &selector).await
        })
        .await
    }

    async fn get_balance(
        &self,
        ctx: &RequestContext,
        account: &AccountSelector,
        consensus_timestamp: Timestamp,
    ) -> Result<AccountBalance, LedgerError> {
        observed("get_balance", async {
            let scope = self.scope(ctx);
            self.balances
                .get_balance(&scope, account, consensus_timestamp)
                .await
        })
        .await
    }

    async fn get_balance_at_block(
        &self,
        ctx: &RequestContext,
        account: &AccountSelector,
        selector: BlockSelector,
    ) -> Result<(Block, AccountBalance), LedgerError> {
        observed("get_balance_at_block", async {
            let scope = self.scope(ctx);
            let block = self.blocks.resolve(&scope, &selector).await?;
            let balance = self
                .balances
                .get_balance(&scope, account, block.consensus_end)
                .await?;
            Ok((block, balance))
        })
        .await
    }

    async fn get_transactions_in_range(
        &self,
        ctx: &RequestContext,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Transaction>, LedgerError> {
        observed("get_transactions_in_range", async {
            let scope = self.scope(ctx);
            self.operations.get_transactions(&scope, start, end).await
        })
        .await
    }

    async fn get_transaction_by_hash(
        &self,
        ctx: &RequestContext,
        hash: &str,
        block_start: Timestamp,
        block_end: Timestamp,
    ) -> Result<Transaction, LedgerError> {
        observed("get_transaction_by_hash", async {
            let scope = self.scope(ctx);
            self.operations
                .get_transaction_by_hash(&scope, hash, block_start, block_end)
                .await
        })
        .await
    }

    async fn get_block_transactions(
        &self,
        ctx: &RequestContext,
        selector: BlockSelector,
    ) -> Result<(Block, Vec<Transaction>), LedgerError> {
        observed("get_block_transactions", async {
            let scope = self.scope(ctx);
            let block = self.blocks.resolve(&scope, &selector).await?;
            let transactions = self
                .operations
                .get_transactions(&scope, block.consensus_start, block.consensus_end)
                .await?;
            Ok((block, transactions))
        })
        .await
    }

    async fn address_book(&self, ctx: &RequestContext) -> Result<Vec<AddressBookEntry>, LedgerError> {
        observed("address_book", async {
            let scope = self.scope(ctx);
            self.address_book.entries(&scope).await
        })
        .await
    }
}
