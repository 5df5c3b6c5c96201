//! # Outbound Ports (Driven Ports)
//!
//! Read-only SPIs over the relational ledger store. Every method is a single
//! query; ids are passed and returned in packed `i64` form.
//!
//! Timestamps are nanoseconds. Ranges are half-open on the left
//! (`after < ts <= up_to`) unless stated otherwise.

use async_trait::async_trait;
use shared_types::{EntityId, LedgerError, Timestamp};
use thiserror::Error;

use crate::domain::rows::{
    AddressBookEndpointRow, CryptoTransferRow, EntityRow, NftTransferRow, RecordFileRow,
    TokenAssociationRow, TokenBalanceRow, TokenTransferRow, TransactionRow, TransferCorrection,
};

/// Store access errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store I/O error: {message}")]
    Io { message: String },

    #[error("Store deadline exceeded during {operation}")]
    Timeout { operation: &'static str },

    #[error("Corrupt store data: {message}")]
    Corrupt { message: String },
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io { .. } | StoreError::Timeout { .. } => {
                LedgerError::DatabaseError(err.to_string())
            }
            StoreError::Corrupt { message } => LedgerError::InternalServerError(message),
        }
    }
}

/// Record files and balance snapshot boundaries.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Timestamp of the very first balance snapshot.
    async fn earliest_snapshot_timestamp(&self) -> Result<Option<Timestamp>, StoreError>;

    /// The earliest record file with `consensus_end > after`.
    async fn first_record_file_ending_after(
        &self,
        after: Timestamp,
    ) -> Result<Option<RecordFileRow>, StoreError>;

    async fn record_file_by_index(&self, index: i64) -> Result<Option<RecordFileRow>, StoreError>;

    /// Lookup by lowercase hex hash without prefix.
    async fn record_file_by_hash(&self, hash: &str) -> Result<Option<RecordFileRow>, StoreError>;

    async fn latest_record_file(&self) -> Result<Option<RecordFileRow>, StoreError>;
}

/// Snapshots and per-account deltas.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn entity(&self, id: i64) -> Result<Option<EntityRow>, StoreError>;

    /// Latest snapshot timestamp at or before `at_or_before`.
    async fn latest_snapshot_timestamp(
        &self,
        at_or_before: Timestamp,
    ) -> Result<Option<Timestamp>, StoreError>;

    /// Hbar balance of `account` in the snapshot taken at `snapshot`.
    async fn snapshot_hbar_balance(
        &self,
        account: i64,
        snapshot: Timestamp,
    ) -> Result<Option<i64>, StoreError>;

    async fn snapshot_token_balances(
        &self,
        account: i64,
        snapshot: Timestamp,
    ) -> Result<Vec<TokenBalanceRow>, StoreError>;

    /// Raw hbar movements of `account`, errata flags included.
    async fn account_crypto_transfers(
        &self,
        account: i64,
        after: Timestamp,
        up_to: Timestamp,
    ) -> Result<Vec<CryptoTransferRow>, StoreError>;

    async fn account_token_transfers(
        &self,
        account: i64,
        after: Timestamp,
        up_to: Timestamp,
    ) -> Result<Vec<TokenTransferRow>, StoreError>;

    /// NFT movements where `account` is sender or receiver.
    async fn account_nft_transfers(
        &self,
        account: i64,
        after: Timestamp,
        up_to: Timestamp,
    ) -> Result<Vec<NftTransferRow>, StoreError>;

    /// Latest association state per token at or before `at_or_before`.
    async fn token_associations(
        &self,
        account: i64,
        at_or_before: Timestamp,
    ) -> Result<Vec<TokenAssociationRow>, StoreError>;
}

/// Transactions with their transfers.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Rows with `start <= ts <= end` ordered by consensus timestamp, at most
    /// `limit` of them.
    async fn transactions_in_range(
        &self,
        start: Timestamp,
        end: Timestamp,
        limit: usize,
    ) -> Result<Vec<TransactionRow>, StoreError>;

    /// Rows with the hash and `start <= ts <= end`.
    async fn transactions_by_hash(
        &self,
        hash: &[u8],
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<TransactionRow>, StoreError>;

    /// Token and NFT transfers as recorded, without the live token join.
    /// Results are ordered by timestamp.
    async fn historical_token_transfers(
        &self,
        timestamps: &[Timestamp],
    ) -> Result<Vec<TransferCorrection>, StoreError>;
}

#[async_trait]
pub trait AddressBookStore: Send + Sync {
    /// Endpoint rows of the most recent address book stored in `file_id`.
    /// Empty when the file never held one.
    async fn latest_address_book_endpoints(
        &self,
        file_id: i64,
    ) -> Result<Vec<AddressBookEndpointRow>, StoreError>;
}

/// Alias and entity id resolution.
#[async_trait]
pub trait AliasDirectory: Send + Sync {
    async fn resolve_alias(&self, alias: &[u8]) -> Result<Option<EntityId>, StoreError>;

    async fn resolve_entity(&self, id: EntityId) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Everything the engine needs from the store.
pub trait LedgerStore:
    BlockStore + BalanceStore + TransactionStore + AddressBookStore + AliasDirectory
{
}

impl<T> LedgerStore for T where
    T: BlockStore + BalanceStore + TransactionStore + AddressBookStore + AliasDirectory
{
}
