//! # Entity Identifiers
//!
//! Ledger entities (accounts, tokens, files) are addressed by a three-part
//! `shard.realm.num` identifier. The relational store keeps them packed into a
//! single signed 64-bit column:
//!
//! ```text
//!  63  62            48 47            32 31                             0
//! ┌───┬────────────────┬────────────────┬────────────────────────────────┐
//! │ 0 │   shard (15)   │   realm (16)   │          number (32)           │
//! └───┴────────────────┴────────────────┴────────────────────────────────┘
//! ```
//!
//! The sign bit is never set by a valid encoding, so negative column values
//! are rejected on decode.

use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest shard number representable in the packed form.
pub const MAX_SHARD: i64 = (1 << 15) - 1;

/// Largest realm number representable in the packed form.
pub const MAX_REALM: i64 = (1 << 16) - 1;

/// Largest entity number representable in the packed form.
pub const MAX_NUMBER: i64 = (1 << 32) - 1;

const REALM_BITS: u32 = 32;
const SHARD_BITS: u32 = 48;

/// Errors produced by the entity id codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityIdError {
    #[error("shard {0} out of range [0, 32767]")]
    ShardOutOfRange(i64),

    #[error("realm {0} out of range [0, 65535]")]
    RealmOutOfRange(i64),

    #[error("number {0} out of range [0, 4294967295]")]
    NumberOutOfRange(i64),

    #[error("negative encoded entity id: {0}")]
    NegativeEncoding(i64),

    #[error("malformed entity id: {0:?}")]
    Malformed(String),
}

/// A decoded `shard.realm.num` identifier.
///
/// Construction always goes through [`EntityId::new`] or [`EntityId::decode`],
/// so every value in circulation has an in-range encoding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct EntityId {
    shard: i64,
    realm: i64,
    number: i64,
}

impl EntityId {
    /// Build an id from its components, validating each range.
    pub fn new(shard: i64, realm: i64, number: i64) -> Result<Self, EntityIdError> {
        if !(0..=MAX_SHARD).contains(&shard) {
            return Err(EntityIdError::ShardOutOfRange(shard));
        }
        if !(0..=MAX_REALM).contains(&realm) {
            return Err(EntityIdError::RealmOutOfRange(realm));
        }
        if !(0..=MAX_NUMBER).contains(&number) {
            return Err(EntityIdError::NumberOutOfRange(number));
        }
        Ok(Self {
            shard,
            realm,
            number,
        })
    }

    /// Shortcut for ids in shard 0, realm 0.
    pub fn of_num(number: i64) -> Result<Self, EntityIdError> {
        Self::new(0, 0, number)
    }

    /// Unpack a store column value.
    pub fn decode(encoded: i64) -> Result<Self, EntityIdError> {
        if encoded < 0 {
            return Err(EntityIdError::NegativeEncoding(encoded));
        }
        Ok(Self {
            shard: encoded >> SHARD_BITS,
            realm: (encoded >> REALM_BITS) & MAX_REALM,
            number: encoded & MAX_NUMBER,
        })
    }

    /// Pack into the store column representation.
    pub fn encode(&self) -> i64 {
        (self.shard << SHARD_BITS) | (self.realm << REALM_BITS) | self.number
    }

    pub fn shard(&self) -> i64 {
        self.shard
    }

    pub fn realm(&self) -> i64 {
        self.realm
    }

    pub fn number(&self) -> i64 {
        self.number
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.number)
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(EntityIdError::Malformed(s.to_string()));
        }

        let mut components = [0i64; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            // Reject "+1" and "" which i64::from_str would otherwise accept or mis-report.
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(EntityIdError::Malformed(s.to_string()));
            }
            *slot = part
                .parse()
                .map_err(|_| EntityIdError::Malformed(s.to_string()))?;
        }

        Self::new(components[0], components[1], components[2])
    }
}

impl TryFrom<i64> for EntityId {
    type Error = EntityIdError;

    fn try_from(encoded: i64) -> Result<Self, Self::Error> {
        Self::decode(encoded)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_max_components() {
        let id = EntityId::new(32767, 65535, 4294967295).unwrap();
        assert_eq!(id.encode(), 9223372036854775807);
        assert_eq!(EntityId::decode(i64::MAX).unwrap(), id);
    }

    #[test]
    fn test_encode_simple() {
        let id = EntityId::new(0, 0, 800).unwrap();
        assert_eq!(id.encode(), 800);
        let id = EntityId::new(1, 2, 3).unwrap();
        assert_eq!(id.encode(), (1 << 48) | (2 << 32) | 3);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(
            EntityId::new(32768, 0, 0),
            Err(EntityIdError::ShardOutOfRange(32768))
        );
        assert_eq!(
            EntityId::new(0, 65536, 0),
            Err(EntityIdError::RealmOutOfRange(65536))
        );
        assert_eq!(
            EntityId::new(0, 0, 4294967296),
            Err(EntityIdError::NumberOutOfRange(4294967296))
        );
        assert!(EntityId::new(-1, 0, 0).is_err());
        assert_eq!(
            EntityId::decode(-1),
            Err(EntityIdError::NegativeEncoding(-1))
        );
    }

    #[test]
    fn test_parse_and_display() {
        let id: EntityId = "0.0.1001".parse().unwrap();
        assert_eq!(id.number(), 1001);
        assert_eq!(id.to_string(), "0.0.1001");

        assert!("0.0".parse::<EntityId>().is_err());
        assert!("0.0.x".parse::<EntityId>().is_err());
        assert!("0.0.+1".parse::<EntityId>().is_err());
        assert!("0..1".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = EntityId::of_num(98).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0.0.98\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    proptest! {
        #[test]
        fn prop_codec_round_trip(
            shard in 0..=MAX_SHARD,
            realm in 0..=MAX_REALM,
            number in 0..=MAX_NUMBER,
        ) {
            let id = EntityId::new(shard, realm, number).unwrap();
            let decoded = EntityId::decode(id.encode()).unwrap();
            prop_assert_eq!((decoded.shard(), decoded.realm(), decoded.number()), (shard, realm, number));
            prop_assert!(id.encode() >= 0);
        }

        #[test]
        fn prop_string_round_trip(number in 0..=MAX_NUMBER) {
            let id = EntityId::of_num(number).unwrap();
            prop_assert_eq!(id.to_string().parse::<EntityId>().unwrap(), id);
        }
    }
}
