use async_trait::async_trait;
use bitcoin::{Address, Txid};

use crate::error::{ExplorerError, Result};
use crate::models::UnspentOutput;

/// The two operations every block explorer backend must provide. The pool
/// only ever calls these; service-specific extras (fee estimates, block
/// listings) live on the concrete adapter types.
#[async_trait]
pub trait Explorer: Send + Sync {
    /// Stable label used in logs and composite failure reports.
    fn name(&self) -> &str;

    /// Confirmed and unconfirmed outputs for all given addresses, flattened
    /// into one sequence. No deduplication is performed.
    async fn fetch_unspent_outputs(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>>;

    /// Submit a raw transaction, returning the id the service reports.
    async fn broadcast(&self, raw_tx: &str) -> Result<Txid>;
}

pub(crate) fn check_addresses(addresses: &[Address]) -> Result<()> {
    if addresses.is_empty() {
        return Err(ExplorerError::Argument(
            "at least one address is required".into(),
        ));
    }

    Ok(())
}

pub(crate) fn check_raw_tx(raw_tx: &str) -> Result<()> {
    if raw_tx.is_empty() || hex::decode(raw_tx).is_err() {
        return Err(ExplorerError::Argument(
            "raw transaction must be a non-empty hex string".into(),
        ));
    }

    Ok(())
}

// Broadcast replies differ only in the field the txid hides under
// ("txid" for Insight, "hash" for BlockCypher).
pub(crate) fn parse_broadcast_txid(body: &str, field: &str) -> Result<Txid> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ExplorerError::MalformedResponse(format!("broadcast reply: {}", e)))?;
    let id = value[field].as_str().ok_or_else(|| {
        ExplorerError::MalformedResponse(format!("broadcast reply has no `{}` field", field))
    })?;

    id.parse::<Txid>()
        .map_err(|_| ExplorerError::MalformedResponse(format!("broadcast txid: `{}`", id)))
}
