use bitcoin::{Address, Network, OutPoint, ScriptBuf, Txid};

/// A spendable output as reported by an explorer, normalized to a single
/// shape regardless of which service produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnspentOutput {
    pub txid: Txid,
    pub output_index: u32,
    pub satoshis: u64,
    pub script: ScriptBuf,
    /// Derived from `script`; `None` when the script is non-standard.
    pub address: Option<Address>,
}

impl UnspentOutput {
    pub fn new(
        txid: Txid,
        output_index: u32,
        satoshis: u64,
        script: ScriptBuf,
        network: Network,
    ) -> Self {
        let address = Address::from_script(&script, network).ok();

        UnspentOutput {
            txid,
            output_index,
            satoshis,
            script,
            address,
        }
    }

    /// Identity key used for cross-backend reconciliation.
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid, self.output_index)
    }
}
