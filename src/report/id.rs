//! Endpoint node identifiers.

use std::net::IpAddr;

/// Separator between identifier components. Scope and namespace must not
/// contain it (enforced by config validation), so distinct inputs always
/// produce distinct identifiers.
const SEP: char = ';';

/// Encodes (scope, namespace, address, port) into a stable node identifier.
///
/// The same function is used for lookups and for constructing new IDs, so
/// identical inputs always map to the same node.
pub fn endpoint_node_id(scope: &str, namespace: &str, ip: IpAddr, port: u16) -> String {
    format!("{scope}{SEP}{namespace}{SEP}{ip}{SEP}{port}")
}
