//! # Reconstruction Properties
//!
//! Randomized checks over generated ledgers: the batched scan must not
//! depend on its page size, and balances must move exactly by the deltas in
//! between.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use ledger_reconstruction::test_utils::{hbar_transfer, id};
    use ledger_reconstruction::{AccountSelector, LedgerApi, LedgerConfig, RequestContext};
    use proptest::prelude::*;
    use shared_types::{Amount, Timestamp};

    use crate::integration::fixtures::{LedgerFixture, GENESIS_SNAPSHOT};

    const ALICE: i64 = 1001;
    const BOB: i64 = 1002;

    /// One generated transfer: offset after the snapshot, direction, amount, fee.
    type Move = (Timestamp, bool, i64, i64);

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn moves() -> impl Strategy<Value = Vec<Move>> {
        prop::collection::btree_set(0i64..2_000, 1..40).prop_flat_map(|offsets: BTreeSet<i64>| {
            let count = offsets.len();
            (
                Just(offsets.into_iter().collect::<Vec<_>>()),
                prop::collection::vec((any::<bool>(), 1i64..1_000, 0i64..10), count),
            )
                .prop_map(|(offsets, legs)| {
                    offsets
                        .into_iter()
                        .zip(legs)
                        .map(|(offset, (alice_pays, amount, fee))| {
                            (GENESIS_SNAPSHOT + 1 + offset, alice_pays, amount, fee)
                        })
                        .collect()
                })
        })
    }

    fn ledger(moves: &[Move]) -> LedgerFixture {
        let fixture = LedgerFixture::new(4).with_accounts(&[(ALICE, 1_000_000), (BOB, 1_000_000)]);
        for &(timestamp, alice_pays, amount, fee) in moves {
            let (from, to) = if alice_pays { (ALICE, BOB) } else { (BOB, ALICE) };
            fixture
                .store
                .insert_transaction(hbar_transfer(timestamp, from, to, amount, fee));
        }
        fixture
    }

    fn alice_delta(moves: &[Move], after: Timestamp, up_to: Timestamp) -> i64 {
        moves
            .iter()
            .filter(|(timestamp, ..)| *timestamp > after && *timestamp <= up_to)
            .map(|&(_, alice_pays, amount, fee)| {
                if alice_pays {
                    -(amount + fee)
                } else {
                    amount
                }
            })
            .sum()
    }

    fn hbar(amounts: &[Amount]) -> i64 {
        amounts.first().map(Amount::value).unwrap_or_default()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_scan_independent_of_batch_size(transfers in moves(), batch_size in 1usize..8) {
            let fixture = ledger(&transfers);
            let end = fixture.end();
            let (paged, whole) = block_on(async {
                let ctx = RequestContext::background();
                let config = LedgerConfig { batch_size, ..LedgerConfig::default() };
                let paged = fixture
                    .service_with(config)
                    .get_transactions_in_range(&ctx, 0, end)
                    .await
                    .unwrap();
                let whole = fixture
                    .service()
                    .get_transactions_in_range(&ctx, 0, end)
                    .await
                    .unwrap();
                (paged, whole)
            });

            prop_assert_eq!(paged.len(), transfers.len());
            prop_assert_eq!(paged, whole);
        }

        #[test]
        fn prop_balances_move_by_deltas(
            transfers in moves(),
            a in 0i64..2_000,
            b in 0i64..2_000,
        ) {
            let fixture = ledger(&transfers);
            let (t1, t2) = (GENESIS_SNAPSHOT + a.min(b), GENESIS_SNAPSHOT + a.max(b));
            let (first, second) = block_on(async {
                let service = fixture.service();
                let ctx = RequestContext::background();
                let alice = AccountSelector::Id(id(ALICE));
                let first = service.get_balance(&ctx, &alice, t1).await.unwrap();
                let second = service.get_balance(&ctx, &alice, t2).await.unwrap();
                (first, second)
            });

            prop_assert_eq!(
                hbar(&second.amounts) - hbar(&first.amounts),
                alice_delta(&transfers, t1, t2)
            );
            prop_assert_eq!(
                hbar(&first.amounts),
                1_000_000 + alice_delta(&transfers, GENESIS_SNAPSHOT, t1)
            );
        }
    }
}
