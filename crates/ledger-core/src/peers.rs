use crate::error::{LedgerError, Result};
use std::collections::BTreeSet;

/// Reduce a peer address to the bare `host:port` form used as its identity.
///
/// A URL (`http://10.0.0.2:5000/anything`) yields its network location;
/// anything without a scheme is taken as the location itself.
pub fn parse_peer_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let invalid = || LedgerError::InvalidAddress(address.to_string());

    let location = match trimmed.find("://") {
        Some(pos) => network_location(&trimmed[pos + 3..]),
        None => match trimmed.strip_prefix("//") {
            Some(rest) => network_location(rest),
            None => trimmed,
        },
    };

    if location.is_empty() || location.contains(char::is_whitespace) || location.contains('/') {
        return Err(invalid());
    }
    Ok(location.to_string())
}

fn network_location(rest: &str) -> &str {
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Registered peers. Entries are never removed; iteration is in address order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerSet {
    nodes: BTreeSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and add `address`, returning its stored form. Registering a peer
    /// twice is not an error.
    pub fn register(&mut self, address: &str) -> Result<String> {
        let location = parse_peer_address(address)?;
        self.nodes.insert(location.clone());
        Ok(location)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.nodes.contains(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
