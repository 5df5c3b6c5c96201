//! Point-in-time balance reconstruction.

use shared_types::{AccountBalance, AccountId, Amount, LedgerError, Timestamp};
use tracing::{debug, instrument};

use crate::adapters::scope::StoreScope;
use crate::domain::balance::{sum_hbar_deltas, BalanceWindow, TokenLedger};
use crate::domain::errors::corrupt_entity;
use crate::domain::rows::EntityRow;
use crate::ports::inbound::AccountSelector;
use crate::ports::outbound::{AliasDirectory, BalanceStore};

/// Reconstructs balances from the latest snapshot plus later deltas.
#[derive(Debug, Default)]
pub struct BalanceReconstructor;

impl BalanceReconstructor {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, scope))]
    pub async fn get_balance<S>(
        &self,
        scope: &StoreScope<'_, S>,
        account: &AccountSelector,
        consensus_end: Timestamp,
    ) -> Result<AccountBalance, LedgerError>
    where
        S: BalanceStore + AliasDirectory + ?Sized,
    {
        let (resolved, entity) = self.resolve_account(scope, account).await?;
        let Some(entity_id) = resolved.entity_id else {
            // An alias that never resolved to an entity has never held
            // anything.
            debug!(account = %resolved, "Alias not resolved, reporting zero balance");
            return Ok(AccountBalance::new(&resolved, vec![Amount::hbar(0)]));
        };

        let window = BalanceWindow::for_entity(entity.as_ref(), consensus_end);
        let account_id = entity_id.encode();
        let store = scope.store();

        let snapshot = scope
            .run(
                "latest_snapshot_timestamp",
                store.latest_snapshot_timestamp(window.snapshot_end),
            )
            .await?
            .ok_or(LedgerError::NodeIsStarting)?;

        let (
            snapshot_hbar,
            snapshot_tokens,
            crypto_transfers,
            token_transfers,
            nft_transfers,
            associations,
        ) = tokio::try_join!(
            scope.run(
                "snapshot_hbar_balance",
                store.snapshot_hbar_balance(account_id, snapshot)
            ),
            scope.run(
                "snapshot_token_balances",
                store.snapshot_token_balances(account_id, snapshot)
            ),
            scope.run(
                "account_crypto_transfers",
                store.account_crypto_transfers(account_id, snapshot, window.balance_change_end)
            ),
            scope.run(
                "account_token_transfers",
                store.account_token_transfers(account_id, snapshot, window.balance_change_end)
            ),
            scope.run(
                "account_nft_transfers",
                store.account_nft_transfers(account_id, snapshot, window.balance_change_end)
            ),
            scope.run(
                "token_associations",
                store.token_associations(account_id, window.balance_change_end)
            ),
        )?;

        let hbar = snapshot_hbar.unwrap_or(0) + sum_hbar_deltas(&crypto_transfers);
        let tokens = TokenLedger {
            account: account_id,
            snapshot_timestamp: snapshot,
            associations: &associations,
            snapshot_balances: &snapshot_tokens,
            token_transfers: &token_transfers,
            nft_transfers: &nft_transfers,
        }
        .amounts()
        .map_err(corrupt_entity)?;

        debug!(
            account = %resolved,
            snapshot,
            deltas = crypto_transfers.len(),
            tokens = tokens.len(),
            "Balance reconstructed"
        );

        let mut amounts = Vec::with_capacity(tokens.len() + 1);
        amounts.push(Amount::hbar(hbar));
        amounts.extend(tokens);
        Ok(AccountBalance::new(&resolved, amounts))
    }

    /// The account behind the selector, with both its id and alias when
    /// known. An alias without an entity comes back alias-only.
    async fn resolve_account<S>(
        &self,
        scope: &StoreScope<'_, S>,
        account: &AccountSelector,
    ) -> Result<(AccountId, Option<EntityRow>), LedgerError>
    where
        S: BalanceStore + AliasDirectory + ?Sized,
    {
        let store = scope.store();
        let mut resolved = account.account_id();
        match account {
            AccountSelector::Id(id) => {
                let entity = scope
                    .run("entity", store.entity(id.encode()))
                    .await?
                    .ok_or_else(|| LedgerError::account_not_found(id))?;
                resolved.alias = scope.run("resolve_entity", store.resolve_entity(*id)).await?;
                Ok((resolved, Some(entity)))
            }
            AccountSelector::Alias(alias) => {
                let Some(id) = scope.run("resolve_alias", store.resolve_alias(alias)).await? else {
                    return Ok((resolved, None));
                };
                let entity = scope.run("entity", store.entity(id.encode())).await?;
                resolved.entity_id = Some(id);
                Ok((resolved, entity))
            }
        }
    }
}
