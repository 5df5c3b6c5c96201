//! Batched transaction scans and lookups by hash.

use mirror_telemetry::{SCAN_BATCHES, TRANSFER_CORRECTIONS};
use shared_types::{LedgerError, Timestamp, Transaction};
use tracing::{debug, instrument, warn};

use crate::adapters::scope::StoreScope;
use crate::domain::genesis::decode_hash;
use crate::domain::operations::{apply_corrections, needs_correction, OperationAssembler};
use crate::domain::rows::TransactionRow;
use crate::ports::outbound::TransactionStore;

/// Reads transaction rows page by page and assembles them into transactions.
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    assembler: OperationAssembler,
    batch_size: usize,
}

impl OperationBuilder {
    pub fn new(assembler: OperationAssembler, batch_size: usize) -> Self {
        Self {
            assembler,
            batch_size,
        }
    }

    /// Transactions with `start <= ts <= end`.
    #[instrument(skip(self, scope))]
    pub async fn get_transactions<S>(
        &self,
        scope: &StoreScope<'_, S>,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Transaction>, LedgerError>
    where
        S: TransactionStore + ?Sized,
    {
        if start > end {
            return Err(LedgerError::start_after_end(start, end));
        }

        let mut rows = Vec::new();
        let mut cursor = start;
        loop {
            let mut page = scope
                .run(
                    "transactions_in_range",
                    scope
                        .store()
                        .transactions_in_range(cursor, end, self.batch_size),
                )
                .await?;
            SCAN_BATCHES.inc();
            self.correct_transfers(scope, &mut page).await?;

            let full = page.len() >= self.batch_size;
            let last = page.last().map(|row| row.consensus_timestamp);
            debug!(cursor, rows = page.len(), "Fetched transaction page");
            rows.extend(page);

            match last {
                Some(last) if full && last < end => cursor = last + 1,
                _ => break,
            }
        }

        self.assembler.assemble(&rows)
    }

    /// The transaction with `hash` inside `[block_start, block_end]`.
    #[instrument(skip(self, scope))]
    pub async fn get_transaction_by_hash<S>(
        &self,
        scope: &StoreScope<'_, S>,
        hash: &str,
        block_start: Timestamp,
        block_end: Timestamp,
    ) -> Result<Transaction, LedgerError>
    where
        S: TransactionStore + ?Sized,
    {
        let hash_bytes = decode_hash(hash)?;
        if block_start > block_end {
            return Err(LedgerError::start_after_end(block_start, block_end));
        }

        let mut rows = scope
            .run(
                "transactions_by_hash",
                scope
                    .store()
                    .transactions_by_hash(&hash_bytes, block_start, block_end),
            )
            .await?;
        if rows.is_empty() {
            return Err(LedgerError::transaction_not_found(hash));
        }
        self.correct_transfers(scope, &mut rows).await?;

        self.assembler
            .assemble(&rows)?
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::transaction_not_found(hash))
    }

    /// Restore token transfers that vanished from the live join because a
    /// dissociate removed the association they joined through.
    async fn correct_transfers<S>(
        &self,
        scope: &StoreScope<'_, S>,
        rows: &mut [TransactionRow],
    ) -> Result<(), LedgerError>
    where
        S: TransactionStore + ?Sized,
    {
        let timestamps: Vec<Timestamp> = rows
            .iter()
            .filter(|row| needs_correction(row, self.assembler.codes()))
            .map(|row| row.consensus_timestamp)
            .collect();
        if timestamps.is_empty() {
            return Ok(());
        }

        let corrections = scope
            .run(
                "historical_token_transfers",
                scope.store().historical_token_transfers(&timestamps),
            )
            .await?;
        TRANSFER_CORRECTIONS.inc();
        warn!(
            dissociates = timestamps.len(),
            corrections = corrections.len(),
            "Restoring token transfers of dissociate transactions"
        );
        apply_corrections(rows, corrections);
        Ok(())
    }
}
