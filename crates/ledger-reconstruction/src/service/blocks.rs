//! Block resolution: genesis memoization and selector lookups.

use shared_types::{Block, LedgerError};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::adapters::scope::StoreScope;
use crate::domain::genesis::{genesis_block, normalize_hash, to_block};
use crate::ports::inbound::BlockSelector;
use crate::ports::outbound::BlockStore;

/// Resolves the genesis block once per process. Failed attempts are not
/// remembered, so a node that is still starting recovers on a later call.
#[derive(Debug, Default)]
pub struct GenesisResolver {
    genesis: OnceCell<Block>,
}

impl GenesisResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<S>(&self, scope: &StoreScope<'_, S>) -> Result<&Block, LedgerError>
    where
        S: BlockStore + ?Sized,
    {
        self.genesis
            .get_or_try_init(|| async {
                let store = scope.store();
                let snapshot = scope
                    .run(
                        "earliest_snapshot_timestamp",
                        store.earliest_snapshot_timestamp(),
                    )
                    .await?
                    .ok_or(LedgerError::NodeIsStarting)?;
                let row = scope
                    .run(
                        "first_record_file_ending_after",
                        store.first_record_file_ending_after(snapshot),
                    )
                    .await?
                    .ok_or_else(LedgerError::block_not_found)?;

                let genesis = genesis_block(&row, snapshot);
                info!(
                    index = genesis.index,
                    hash = %genesis.hash,
                    consensus_start = genesis.consensus_start,
                    first_snapshot = snapshot,
                    "Genesis block resolved"
                );
                Ok::<_, LedgerError>(genesis)
            })
            .await
    }

    /// The memoized genesis, if already resolved.
    pub fn cached(&self) -> Option<&Block> {
        self.genesis.get()
    }
}

/// Looks blocks up by index, hash or both.
#[derive(Debug, Default)]
pub struct BlockIndexer {
    genesis: GenesisResolver,
}

impl BlockIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<S>(
        &self,
        scope: &StoreScope<'_, S>,
        selector: &BlockSelector,
    ) -> Result<Block, LedgerError>
    where
        S: BlockStore + ?Sized,
    {
        match selector {
            BlockSelector::Index(index) => self.find_by_index(scope, *index).await,
            BlockSelector::Hash(hash) => self.find_by_hash(scope, hash).await,
            BlockSelector::IndexAndHash(index, hash) => {
                self.find_by_identifier(scope, *index, hash).await
            }
            BlockSelector::Latest => self.retrieve_latest(scope).await,
            BlockSelector::Genesis => self.retrieve_genesis(scope).await,
        }
    }

    #[instrument(skip(self, scope))]
    pub async fn find_by_index<S>(
        &self,
        scope: &StoreScope<'_, S>,
        index: i64,
    ) -> Result<Block, LedgerError>
    where
        S: BlockStore + ?Sized,
    {
        if index < 0 {
            return Err(LedgerError::InvalidArgument(format!(
                "block index must not be negative: {}",
                index
            )));
        }
        let genesis = self.genesis.resolve(scope).await?;
        if index < genesis.index {
            debug!(genesis_index = genesis.index, "Block precedes genesis");
            return Err(LedgerError::block_not_found());
        }

        let row = scope
            .run(
                "record_file_by_index",
                scope.store().record_file_by_index(index),
            )
            .await?
            .ok_or_else(LedgerError::block_not_found)?;
        Ok(to_block(&row, genesis))
    }

    #[instrument(skip(self, scope))]
    pub async fn find_by_hash<S>(
        &self,
        scope: &StoreScope<'_, S>,
        hash: &str,
    ) -> Result<Block, LedgerError>
    where
        S: BlockStore + ?Sized,
    {
        let hash = normalize_hash(hash)?;
        let genesis = self.genesis.resolve(scope).await?;

        let row = scope
            .run("record_file_by_hash", scope.store().record_file_by_hash(&hash))
            .await?
            .ok_or_else(LedgerError::block_not_found)?;
        if row.index < genesis.index {
            debug!(genesis_index = genesis.index, "Block precedes genesis");
            return Err(LedgerError::block_not_found());
        }
        Ok(to_block(&row, genesis))
    }

    /// Lookup by index, verified against the hash.
    pub async fn find_by_identifier<S>(
        &self,
        scope: &StoreScope<'_, S>,
        index: i64,
        hash: &str,
    ) -> Result<Block, LedgerError>
    where
        S: BlockStore + ?Sized,
    {
        let expected = normalize_hash(hash)?;
        let block = self.find_by_index(scope, index).await?;
        let actual = block.hash.trim_start_matches("0x");
        if actual != expected {
            debug!(index, %expected, %actual, "Block identifier mismatch");
            return Err(LedgerError::block_not_found());
        }
        Ok(block)
    }

    pub async fn retrieve_latest<S>(&self, scope: &StoreScope<'_, S>) -> Result<Block, LedgerError>
    where
        S: BlockStore + ?Sized,
    {
        let genesis = self.genesis.resolve(scope).await?;
        let row = scope
            .run("latest_record_file", scope.store().latest_record_file())
            .await?
            .ok_or_else(LedgerError::block_not_found)?;
        if row.index < genesis.index {
            return Err(LedgerError::block_not_found());
        }
        Ok(to_block(&row, genesis))
    }

    pub async fn retrieve_genesis<S>(&self, scope: &StoreScope<'_, S>) -> Result<Block, LedgerError>
    where
        S: BlockStore + ?Sized,
    {
        self.genesis.resolve(scope).await.cloned()
    }

    pub fn genesis(&self) -> &GenesisResolver {
        &self.genesis
    }
}
