//! # In-Memory Ledger Store
//!
//! A complete [`LedgerStore`](crate::ports::outbound::LedgerStore) over
//! in-memory tables, keyed by packed ids the way the relational schema is.
//! Used by tests and local tooling.
//!
//! The live transaction query drops token and NFT transfers of deleted tokens,
//! like the production join with the token table does. The historical query
//! returns transfers as recorded.
//!
//! Failures and latency can be injected to exercise deadline and error paths.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{EntityId, Timestamp, TokenType};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::domain::rows::{
    AddressBookEndpointRow, CryptoTransferRow, EntityRow, NftTransferRow, RecordFileRow,
    TokenAssociationRow, TokenBalanceRow, TokenRow, TokenTransferRow, TransactionRow,
    TransferCorrection,
};
use crate::ports::outbound::{
    AddressBookStore, AliasDirectory, BalanceStore, BlockStore, StoreError, TransactionStore,
};

#[derive(Debug, Default)]
struct Snapshot {
    hbar: HashMap<i64, i64>,
    tokens: HashMap<i64, BTreeMap<i64, i64>>,
}

#[derive(Debug, Clone)]
struct TokenState {
    decimals: u32,
    token_type: TokenType,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct AssociationEvent {
    account: i64,
    token_id: i64,
    associated: bool,
    timestamp: Timestamp,
}

#[derive(Debug, Default)]
struct Tables {
    record_files: BTreeMap<i64, RecordFileRow>,
    snapshots: BTreeMap<Timestamp, Snapshot>,
    entities: HashMap<i64, EntityRow>,
    tokens: HashMap<i64, TokenState>,
    associations: Vec<AssociationEvent>,
    /// Ordered by consensus timestamp.
    transactions: Vec<TransactionRow>,
    address_books: HashMap<i64, BTreeMap<Timestamp, Vec<AddressBookEndpointRow>>>,
}

/// In-memory ledger store.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    tables: RwLock<Tables>,
    failure: RwLock<Option<StoreError>>,
    latency: RwLock<Option<Duration>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // INGESTION
    // =========================================================================

    pub fn insert_record_file(&self, row: RecordFileRow) {
        self.tables.write().record_files.insert(row.index, row);
    }

    /// Register a snapshot taken at `timestamp`, even if it holds no balances.
    pub fn insert_snapshot(&self, timestamp: Timestamp) {
        self.tables.write().snapshots.entry(timestamp).or_default();
    }

    pub fn set_snapshot_hbar(&self, timestamp: Timestamp, account: EntityId, balance: i64) {
        self.tables
            .write()
            .snapshots
            .entry(timestamp)
            .or_default()
            .hbar
            .insert(account.encode(), balance);
    }

    pub fn set_snapshot_token(
        &self,
        timestamp: Timestamp,
        account: EntityId,
        token: EntityId,
        balance: i64,
    ) {
        self.tables
            .write()
            .snapshots
            .entry(timestamp)
            .or_default()
            .tokens
            .entry(account.encode())
            .or_default()
            .insert(token.encode(), balance);
    }

    pub fn insert_entity(&self, row: EntityRow) {
        self.tables.write().entities.insert(row.id, row);
    }

    pub fn insert_token(&self, row: &TokenRow) {
        self.tables.write().tokens.insert(
            row.token_id,
            TokenState {
                decimals: row.decimals,
                token_type: row.token_type,
                deleted: false,
            },
        );
    }

    /// Mark a token deleted; its transfers vanish from the live join.
    pub fn delete_token(&self, token: EntityId) {
        if let Some(state) = self.tables.write().tokens.get_mut(&token.encode()) {
            state.deleted = true;
        }
    }

    /// Record an association (or dissociation) taking effect at `timestamp`.
    pub fn set_association(
        &self,
        account: EntityId,
        token: EntityId,
        associated: bool,
        timestamp: Timestamp,
    ) {
        self.tables.write().associations.push(AssociationEvent {
            account: account.encode(),
            token_id: token.encode(),
            associated,
            timestamp,
        });
    }

    pub fn insert_transaction(&self, row: TransactionRow) {
        let mut tables = self.tables.write();
        let position = tables
            .transactions
            .partition_point(|existing| existing.consensus_timestamp <= row.consensus_timestamp);
        tables.transactions.insert(position, row);
    }

    pub fn insert_address_book(
        &self,
        file_id: EntityId,
        timestamp: Timestamp,
        rows: Vec<AddressBookEndpointRow>,
    ) {
        self.tables
            .write()
            .address_books
            .entry(file_id.encode())
            .or_default()
            .insert(timestamp, rows);
    }

    // =========================================================================
    // FAULT INJECTION
    // =========================================================================

    /// Fail every subsequent call with `failure`, or stop failing with `None`.
    pub fn fail_with(&self, failure: Option<StoreError>) {
        *self.failure.write() = failure;
    }

    /// Delay every subsequent call.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    async fn enter(&self) -> Result<(), StoreError> {
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.failure.read().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn live_token_transfers(tables: &Tables, row: &TransactionRow) -> TransactionRow {
        let live = |token_id: &i64| {
            tables
                .tokens
                .get(token_id)
                .map(|state| !state.deleted)
                .unwrap_or(true)
        };
        let mut row = row.clone();
        row.token_transfers.retain(|t| live(&t.token_id));
        row.nft_transfers.retain(|t| live(&t.token_id));
        row
    }

    fn transfers_between<'a>(
        tables: &'a Tables,
        after: Timestamp,
        up_to: Timestamp,
    ) -> impl Iterator<Item = &'a TransactionRow> + 'a {
        tables
            .transactions
            .iter()
            .filter(move |row| row.consensus_timestamp > after && row.consensus_timestamp <= up_to)
    }
}

#[async_trait]
impl BlockStore for InMemoryLedgerStore {
    async fn earliest_snapshot_timestamp(&self) -> Result<Option<Timestamp>, StoreError> {
        self.enter().await?;
        Ok(self.tables.read().snapshots.keys().next().copied())
    }

    async fn first_record_file_ending_after(
        &self,
        after: Timestamp,
    ) -> Result<Option<RecordFileRow>, StoreError> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .record_files
            .values()
            .find(|row| row.consensus_end > after)
            .cloned())
    }

    async fn record_file_by_index(&self, index: i64) -> Result<Option<RecordFileRow>, StoreError> {
        self.enter().await?;
        Ok(self.tables.read().record_files.get(&index).cloned())
    }

    async fn record_file_by_hash(&self, hash: &str) -> Result<Option<RecordFileRow>, StoreError> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .record_files
            .values()
            .find(|row| row.hash.eq_ignore_ascii_case(hash))
            .cloned())
    }

    async fn latest_record_file(&self) -> Result<Option<RecordFileRow>, StoreError> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .record_files
            .values()
            .next_back()
            .cloned())
    }
}

#[async_trait]
impl BalanceStore for InMemoryLedgerStore {
    async fn entity(&self, id: i64) -> Result<Option<EntityRow>, StoreError> {
        self.enter().await?;
        Ok(self.tables.read().entities.get(&id).cloned())
    }

    async fn latest_snapshot_timestamp(
        &self,
        at_or_before: Timestamp,
    ) -> Result<Option<Timestamp>, StoreError> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .snapshots
            .range(..=at_or_before)
            .next_back()
            .map(|(timestamp, _)| *timestamp))
    }

    async fn snapshot_hbar_balance(
        &self,
        account: i64,
        snapshot: Timestamp,
    ) -> Result<Option<i64>, StoreError> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .snapshots
            .get(&snapshot)
            .and_then(|s| s.hbar.get(&account).copied()))
    }

    async fn snapshot_token_balances(
        &self,
        account: i64,
        snapshot: Timestamp,
    ) -> Result<Vec<TokenBalanceRow>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        let balances = tables
            .snapshots
            .get(&snapshot)
            .and_then(|s| s.tokens.get(&account))
            .map(|tokens| {
                tokens
                    .iter()
                    .map(|(token_id, balance)| TokenBalanceRow {
                        token_id: *token_id,
                        balance: *balance,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(balances)
    }

    async fn account_crypto_transfers(
        &self,
        account: i64,
        after: Timestamp,
        up_to: Timestamp,
    ) -> Result<Vec<CryptoTransferRow>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(Self::transfers_between(&tables, after, up_to)
            .flat_map(|row| row.crypto_transfers.iter())
            .filter(|t| t.account_id == account)
            .cloned()
            .collect())
    }

    async fn account_token_transfers(
        &self,
        account: i64,
        after: Timestamp,
        up_to: Timestamp,
    ) -> Result<Vec<TokenTransferRow>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(Self::transfers_between(&tables, after, up_to)
            .flat_map(|row| row.token_transfers.iter())
            .filter(|t| t.account_id == account)
            .cloned()
            .collect())
    }

    async fn account_nft_transfers(
        &self,
        account: i64,
        after: Timestamp,
        up_to: Timestamp,
    ) -> Result<Vec<NftTransferRow>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(Self::transfers_between(&tables, after, up_to)
            .flat_map(|row| row.nft_transfers.iter())
            .filter(|t| t.sender == Some(account) || t.receiver == Some(account))
            .cloned()
            .collect())
    }

    async fn token_associations(
        &self,
        account: i64,
        at_or_before: Timestamp,
    ) -> Result<Vec<TokenAssociationRow>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        let mut latest: BTreeMap<i64, &AssociationEvent> = BTreeMap::new();
        for event in tables
            .associations
            .iter()
            .filter(|e| e.account == account && e.timestamp <= at_or_before)
        {
            match latest.get(&event.token_id) {
                Some(current) if current.timestamp > event.timestamp => {}
                _ => {
                    latest.insert(event.token_id, event);
                }
            }
        }

        latest
            .into_values()
            .map(|event| {
                let token = tables.tokens.get(&event.token_id).ok_or_else(|| {
                    StoreError::Corrupt {
                        message: format!("association references unknown token {}", event.token_id),
                    }
                })?;
                Ok(TokenAssociationRow {
                    token_id: event.token_id,
                    associated: event.associated,
                    timestamp: event.timestamp,
                    decimals: token.decimals,
                    token_type: token.token_type,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TransactionStore for InMemoryLedgerStore {
    async fn transactions_in_range(
        &self,
        start: Timestamp,
        end: Timestamp,
        limit: usize,
    ) -> Result<Vec<TransactionRow>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(tables
            .transactions
            .iter()
            .filter(|row| row.consensus_timestamp >= start && row.consensus_timestamp <= end)
            .take(limit)
            .map(|row| Self::live_token_transfers(&tables, row))
            .collect())
    }

    async fn transactions_by_hash(
        &self,
        hash: &[u8],
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<TransactionRow>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(tables
            .transactions
            .iter()
            .filter(|row| {
                row.hash == hash && row.consensus_timestamp >= start && row.consensus_timestamp <= end
            })
            .map(|row| Self::live_token_transfers(&tables, row))
            .collect())
    }

    async fn historical_token_transfers(
        &self,
        timestamps: &[Timestamp],
    ) -> Result<Vec<TransferCorrection>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(tables
            .transactions
            .iter()
            .filter(|row| timestamps.contains(&row.consensus_timestamp))
            .map(|row| TransferCorrection {
                consensus_timestamp: row.consensus_timestamp,
                token_transfers: row.token_transfers.clone(),
                nft_transfers: row.nft_transfers.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl AddressBookStore for InMemoryLedgerStore {
    async fn latest_address_book_endpoints(
        &self,
        file_id: i64,
    ) -> Result<Vec<AddressBookEndpointRow>, StoreError> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .address_books
            .get(&file_id)
            .and_then(|books| books.values().next_back().cloned())
            .unwrap_or_default())
    }
}

#[async_trait]
impl AliasDirectory for InMemoryLedgerStore {
    async fn resolve_alias(&self, alias: &[u8]) -> Result<Option<EntityId>, StoreError> {
        self.enter().await?;
        let tables = self.tables.read();
        let Some(row) = tables
            .entities
            .values()
            .find(|row| row.alias.as_deref() == Some(alias))
        else {
            return Ok(None);
        };
        EntityId::decode(row.id)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                message: e.to_string(),
            })
    }

    async fn resolve_entity(&self, id: EntityId) -> Result<Option<Vec<u8>>, StoreError> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .entities
            .get(&id.encode())
            .and_then(|row| row.alias.clone()))
    }
}
