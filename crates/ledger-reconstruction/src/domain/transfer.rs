//! # Transfers
//!
//! Every kind of balance movement (hbar, staking reward, fungible token,
//! single NFT serial) answers the same two questions: whose balance moved and
//! by what amount. Operation assembly works only through [`Transfer`].

use shared_types::{Amount, EntityId, EntityIdError, TokenAmount, TokenType};

use super::rows::{
    CryptoTransferRow, HbarTransfer, NftTransferRow, StakingRewardTransferRow, TokenTransferRow,
};

pub trait Transfer {
    /// Packed id of the account whose balance moves.
    fn account_id(&self) -> i64;

    /// Signed amount of the movement.
    fn amount(&self) -> Result<Amount, EntityIdError>;
}

impl Transfer for CryptoTransferRow {
    fn account_id(&self) -> i64 {
        self.account_id
    }

    fn amount(&self) -> Result<Amount, EntityIdError> {
        Ok(Amount::hbar(self.amount))
    }
}

impl Transfer for HbarTransfer {
    fn account_id(&self) -> i64 {
        self.account_id
    }

    fn amount(&self) -> Result<Amount, EntityIdError> {
        Ok(Amount::hbar(self.amount))
    }
}

impl Transfer for StakingRewardTransferRow {
    fn account_id(&self) -> i64 {
        self.account_id
    }

    fn amount(&self) -> Result<Amount, EntityIdError> {
        Ok(Amount::hbar(self.amount))
    }
}

impl Transfer for TokenTransferRow {
    fn account_id(&self) -> i64 {
        self.account_id
    }

    fn amount(&self) -> Result<Amount, EntityIdError> {
        Ok(Amount::Token(TokenAmount {
            token_id: EntityId::decode(self.token_id)?,
            decimals: self.decimals,
            token_type: self.token_type,
            value: self.amount,
            serial_numbers: Vec::new(),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NftDirection {
    Debit,
    Credit,
}

/// One side of an NFT serial movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleNftTransfer {
    pub account_id: i64,
    pub token_id: i64,
    pub serial_number: i64,
    pub direction: NftDirection,
}

impl SingleNftTransfer {
    pub fn delta(&self) -> i64 {
        match self.direction {
            NftDirection::Debit => -1,
            NftDirection::Credit => 1,
        }
    }
}

impl Transfer for SingleNftTransfer {
    fn account_id(&self) -> i64 {
        self.account_id
    }

    fn amount(&self) -> Result<Amount, EntityIdError> {
        Ok(Amount::Token(TokenAmount {
            token_id: EntityId::decode(self.token_id)?,
            decimals: 0,
            token_type: TokenType::NonFungibleUnique,
            value: self.delta(),
            serial_numbers: vec![self.serial_number],
        }))
    }
}

impl NftTransferRow {
    /// Sender debit first, then receiver credit. Mints yield only the credit,
    /// burns and wipes only the debit.
    pub fn split(&self) -> impl Iterator<Item = SingleNftTransfer> + '_ {
        let debit = self.sender.map(|account_id| SingleNftTransfer {
            account_id,
            token_id: self.token_id,
            serial_number: self.serial_number,
            direction: NftDirection::Debit,
        });
        let credit = self.receiver.map(|account_id| SingleNftTransfer {
            account_id,
            token_id: self.token_id,
            serial_number: self.serial_number,
            direction: NftDirection::Credit,
        });
        debit.into_iter().chain(credit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nft_split_orders_debit_before_credit() {
        let row = NftTransferRow {
            sender: Some(1001),
            receiver: Some(1002),
            serial_number: 7,
            token_id: 3000,
        };
        let legs: Vec<_> = row.split().collect();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].account_id, 1001);
        assert_eq!(legs[0].delta(), -1);
        assert_eq!(legs[1].account_id, 1002);
        assert_eq!(legs[1].delta(), 1);
    }

    #[test]
    fn test_mint_has_only_credit() {
        let row = NftTransferRow {
            sender: None,
            receiver: Some(1002),
            serial_number: 1,
            token_id: 3000,
        };
        let legs: Vec<_> = row.split().collect();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].direction, NftDirection::Credit);
    }

    #[test]
    fn test_nft_amount_carries_serial() {
        let leg = SingleNftTransfer {
            account_id: 1001,
            token_id: 3000,
            serial_number: 42,
            direction: NftDirection::Debit,
        };
        match leg.amount().unwrap() {
            Amount::Token(amount) => {
                assert_eq!(amount.value, -1);
                assert_eq!(amount.serial_numbers, vec![42]);
                assert_eq!(amount.token_type, TokenType::NonFungibleUnique);
                assert_eq!(amount.token_id.to_string(), "0.0.3000");
            }
            other => panic!("expected token amount, got {:?}", other),
        }
    }

    #[test]
    fn test_token_amount_rejects_corrupt_token_id() {
        let row = TokenTransferRow {
            account_id: 1001,
            token_id: -1,
            amount: 10,
            decimals: 2,
            token_type: TokenType::FungibleCommon,
        };
        assert!(row.amount().is_err());
    }
}
