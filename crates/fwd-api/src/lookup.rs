//! Network lookup helpers shared by the task layer.

use crate::{ApiError, ForwardApi};
use serde::{Deserialize, Serialize};

/// One hit from [`search_networks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMatch {
    pub id: i64,
    pub name: String,
}

/// Resolve a network id by exact name. `None` when no network carries the
/// name — callers decide whether that is fatal.
pub fn find_network_id(api: &dyn ForwardApi, name: &str) -> Result<Option<i64>, ApiError> {
    let networks = api.list_networks()?;
    Ok(networks.into_iter().find(|n| n.name == name).map(|n| n.id))
}

/// All networks whose name contains `keyword` (empty keyword matches all).
pub fn search_networks(api: &dyn ForwardApi, keyword: &str) -> Result<Vec<NetworkMatch>, ApiError> {
    let networks = api.list_networks()?;
    Ok(networks
        .into_iter()
        .filter(|n| n.name.contains(keyword))
        .map(|n| NetworkMatch { id: n.id, name: n.name })
        .collect())
}
