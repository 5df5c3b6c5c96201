//! Address book aggregation: one entry per node, endpoints in row order.

use shared_types::{AddressBookEntry, LedgerError};
use std::collections::btree_map::{BTreeMap, Entry};

use super::errors::decode_entity;
use super::rows::AddressBookEndpointRow;

pub fn aggregate_endpoints(
    rows: &[AddressBookEndpointRow],
) -> Result<Vec<AddressBookEntry>, LedgerError> {
    let mut nodes: BTreeMap<i64, AddressBookEntry> = BTreeMap::new();
    for row in rows {
        let entry = match nodes.entry(row.node_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(AddressBookEntry {
                node_id: row.node_id,
                account_id: decode_entity(row.node_account_id)?,
                endpoints: Vec::new(),
            }),
        };
        if !row.ip_address.is_empty() {
            entry
                .endpoints
                .push(format!("{}:{}", row.ip_address, row.port));
        }
    }
    Ok(nodes.into_values().collect())
}
