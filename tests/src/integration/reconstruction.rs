//! # End-to-End Reconstruction Flows
//!
//! Drives the engine the way an API front end does: resolve a block, list its
//! transactions, then read balances at its end.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger_reconstruction::domain::codes::{result, transaction_type};
    use ledger_reconstruction::test_utils::{
        crypto, endpoint, entity, id, itemized, nft, token, transaction_row, NODE,
    };
    use ledger_reconstruction::{
        AccountSelector, BlockSelector, LedgerApi, LedgerConfig, RequestContext,
        StakingRewardTransferRow,
    };
    use mirror_telemetry::{encode_metrics, register_metrics};
    use shared_types::{AccountBalance, Amount, TokenType};

    use crate::integration::fixtures::{LedgerFixture, BLOCK_SPAN};

    const ALICE: i64 = 1001;
    const BOB: i64 = 1002;
    const REWARD_ACCOUNT: i64 = 800;
    const NFT_TOKEN: i64 = 5000;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Block 2 holds, in order: an NFT token creation, a mint of two serials
    /// to ALICE, a transfer ALICE -> BOB that also pays ALICE a staking
    /// reward, and a transfer of serial 1 to BOB.
    fn nft_ledger() -> LedgerFixture {
        let fixture = LedgerFixture::new(4).with_accounts(&[
            (ALICE, 10_000),
            (BOB, 500),
            (REWARD_ACCOUNT, 1_000_000),
        ]);
        let store = &fixture.store;
        let nft_token = token(NFT_TOKEN, TokenType::NonFungibleUnique);
        store.insert_token(&nft_token);
        store.set_association(id(ALICE), id(NFT_TOKEN), true, 2 * BLOCK_SPAN + 100);
        store.set_association(id(BOB), id(NFT_TOKEN), true, 2 * BLOCK_SPAN + 350);

        let mut create = transaction_row(
            2 * BLOCK_SPAN + 100,
            b"create",
            transaction_type::TOKEN_CREATION,
            result::SUCCESS,
        );
        create.crypto_transfers = vec![crypto(ALICE, -20), crypto(NODE, 20)];
        create.entity_id = Some(NFT_TOKEN);
        create.token = Some(nft_token);
        store.insert_transaction(create);

        let mut mint = transaction_row(
            2 * BLOCK_SPAN + 200,
            b"mint",
            transaction_type::TOKEN_MINT,
            result::SUCCESS,
        );
        mint.nft_transfers = vec![
            nft(None, Some(ALICE), NFT_TOKEN, 1),
            nft(None, Some(ALICE), NFT_TOKEN, 2),
        ];
        store.insert_transaction(mint);

        let mut transfer = transaction_row(
            2 * BLOCK_SPAN + 300,
            b"reward",
            transaction_type::CRYPTO_TRANSFER,
            result::SUCCESS,
        );
        transfer.crypto_transfers = vec![
            crypto(ALICE, -105 + 7),
            crypto(BOB, 100),
            crypto(NODE, 5),
            crypto(REWARD_ACCOUNT, -7),
        ];
        transfer.itemized_transfers = vec![itemized(ALICE, -100), itemized(BOB, 100)];
        transfer.staking_reward_transfers = vec![StakingRewardTransferRow {
            account_id: ALICE,
            amount: 7,
        }];
        store.insert_transaction(transfer);

        let mut send_nft = transaction_row(
            2 * BLOCK_SPAN + 400,
            b"send-nft",
            transaction_type::CRYPTO_TRANSFER,
            result::SUCCESS,
        );
        send_nft.nft_transfers = vec![nft(Some(ALICE), Some(BOB), NFT_TOKEN, 1)];
        store.insert_transaction(send_nft);

        fixture
    }

    fn summary(balance: &AccountBalance) -> Vec<(String, i64)> {
        balance
            .amounts
            .iter()
            .map(|amount| match amount.token_id() {
                Some(token_id) => (token_id.to_string(), amount.value()),
                None => ("hbar".to_string(), amount.value()),
            })
            .collect()
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_block_flow_with_rewards_and_nfts() {
        let fixture = nft_ledger();
        let service = fixture.service();
        let ctx = RequestContext::background();

        let (block, transactions) = service
            .get_block_transactions(&ctx, BlockSelector::Index(2))
            .await
            .unwrap();
        assert_eq!(block.parent_index, 1);
        assert_eq!(transactions.len(), 4);

        let create = &transactions[0];
        assert_eq!(create.entity_id, Some(id(NFT_TOKEN)));
        let definition = create.operations.last().unwrap();
        assert_eq!(definition.operation_type, "TOKENCREATION");
        let metadata = definition.metadata.as_ref().unwrap();
        assert_eq!(metadata["currency"]["metadata"]["type"], "NON_FUNGIBLE_UNIQUE");

        let mint = &transactions[1];
        assert_eq!(mint.operations.len(), 2);
        assert!(mint.operations.iter().all(|op| op.amount.value() == 1));

        let reward = &transactions[2];
        let ops: Vec<(&str, String, i64)> = reward
            .operations
            .iter()
            .map(|op| {
                (
                    op.operation_type.as_str(),
                    op.account_id.to_string(),
                    op.amount.value(),
                )
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                ("CRYPTOTRANSFER", "0.0.1001".to_string(), -100),
                ("CRYPTOTRANSFER", "0.0.1002".to_string(), 100),
                ("FEE", "0.0.1001".to_string(), -5),
                ("FEE", id(NODE).to_string(), 5),
                ("CRYPTOTRANSFER", "0.0.1001".to_string(), 7),
                ("CRYPTOTRANSFER", "0.0.800".to_string(), -7),
            ]
        );

        let send_nft = &transactions[3];
        let legs: Vec<(String, i64)> = send_nft
            .operations
            .iter()
            .map(|op| (op.account_id.to_string(), op.amount.value()))
            .collect();
        assert_eq!(
            legs,
            vec![("0.0.1001".to_string(), -1), ("0.0.1002".to_string(), 1)]
        );

        let json = serde_json::to_value(&reward.operations[0]).unwrap();
        assert_eq!(json["type"], "CRYPTOTRANSFER");
        assert_eq!(json["amount"]["currency"], "hbar");
        assert_eq!(json["account_id"], "0.0.1001");
    }

    #[tokio::test]
    async fn test_balances_at_block_end() {
        let fixture = nft_ledger();
        let service = fixture.service();
        let ctx = RequestContext::background();
        let alice: AccountSelector = "0.0.1001".parse().unwrap();
        let bob: AccountSelector = "0.0.1002".parse().unwrap();

        let (_, alice_balance) = service
            .get_balance_at_block(&ctx, &alice, BlockSelector::Index(2))
            .await
            .unwrap();
        assert_eq!(
            summary(&alice_balance),
            vec![("hbar".to_string(), 10_000 - 20 - 98), ("0.0.5000".to_string(), 1)]
        );

        let (_, bob_balance) = service
            .get_balance_at_block(&ctx, &bob, BlockSelector::Latest)
            .await
            .unwrap();
        assert_eq!(
            summary(&bob_balance),
            vec![("hbar".to_string(), 600), ("0.0.5000".to_string(), 1)]
        );

        let reward_account = AccountSelector::Id(id(REWARD_ACCOUNT));
        let (_, reward_balance) = service
            .get_balance_at_block(&ctx, &reward_account, BlockSelector::Latest)
            .await
            .unwrap();
        assert_eq!(reward_balance.amounts, vec![Amount::hbar(1_000_000 - 7)]);
    }

    #[tokio::test]
    async fn test_concurrent_queries_share_one_genesis() {
        let fixture = nft_ledger();
        let service = Arc::new(fixture.service());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let ctx = RequestContext::background();
                service
                    .get_balance_at_block(
                        &ctx,
                        &AccountSelector::Id(id(ALICE)),
                        BlockSelector::Genesis,
                    )
                    .await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }
        let (genesis, balance) = &results[0];
        assert!(genesis.is_self_referential());
        assert_eq!(genesis.index, 1);
        assert!(results.iter().all(|(b, a)| b == genesis && a == balance));
        assert_eq!(service.cached_genesis(), Some(genesis));
    }

    #[tokio::test]
    async fn test_engine_behind_trait_object() {
        let fixture = LedgerFixture::new(2).with_accounts(&[(ALICE, 1)]);
        let config = LedgerConfig::default();
        fixture.store.insert_address_book(
            config.address_book_file,
            1,
            vec![endpoint(0, "35.237.200.180", 50211), endpoint(0, "35.237.200.180", 50212)],
        );
        fixture.store.insert_entity(entity(BOB));
        let api: Arc<dyn LedgerApi> = Arc::new(fixture.service_with(config));
        let ctx = RequestContext::background();

        let nodes = api.address_book(&ctx).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].endpoints.len(), 2);

        let balance = api
            .get_balance(&ctx, &AccountSelector::Id(id(BOB)), fixture.end())
            .await
            .unwrap();
        assert_eq!(balance.amounts, vec![Amount::hbar(0)]);
    }

    #[tokio::test]
    async fn test_metrics_exposition_after_queries() {
        register_metrics().unwrap();
        let fixture = nft_ledger();
        let service = fixture.service();
        service
            .resolve_block(&RequestContext::background(), BlockSelector::Latest)
            .await
            .unwrap();

        let text = encode_metrics().unwrap();
        assert!(text.contains("mirror_ledger_queries_total"));
        assert!(text.contains("mirror_ledger_query_duration_seconds"));
    }
}
