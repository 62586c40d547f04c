use std::str::FromStr;

use async_trait::async_trait;
use bitcoin::{Address, Network, ScriptBuf, Txid};
use futures::future::join_all;
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ExplorerError, Result};
use crate::explorer::{check_addresses, check_raw_tx, parse_broadcast_txid, Explorer};
use crate::models::numeric::satoshis_from_json;
use crate::models::UnspentOutput;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::DEFAULT_NETWORK;

const MAINNET_URL: &str = "https://api.blockcypher.com/v1/btc/main";
const TESTNET_URL: &str = "https://api.blockcypher.com/v1/btc/test3";

/// Client for the BlockCypher API.
pub struct BlockCypher {
    url: String,
    network: Network,
    transport: Box<dyn HttpTransport>,
}

impl BlockCypher {
    pub fn new() -> Self {
        BlockCypher::for_network(DEFAULT_NETWORK)
    }

    pub fn for_network(network: Network) -> Self {
        let url = match network {
            Network::Bitcoin => MAINNET_URL,
            _ => TESTNET_URL,
        };

        BlockCypher::with_url(url, network)
    }

    pub fn with_url(url: impl Into<String>, network: Network) -> Self {
        BlockCypher::with_transport(url, network, Box::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        url: impl Into<String>,
        network: Network,
        transport: Box<dyn HttpTransport>,
    ) -> Self {
        BlockCypher {
            url: url.into(),
            network,
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn network(&self) -> Network {
        self.network
    }

    async fn address_utxos(&self, address: &Address) -> Result<Vec<UnspentOutput>> {
        let url = format!(
            "{}/addrs/{}?unspentOnly=true&includeScript=true",
            self.url, address
        );
        let body = self.transport.get(&url).await?.require_status(200)?;
        let info: BlockCypherAddress = serde_json::from_str(&body)
            .map_err(|e| ExplorerError::MalformedResponse(format!("address utxos: {}", e)))?;

        // Confirmed outputs first, then the mempool ones.
        info.txrefs
            .unwrap_or_default()
            .into_iter()
            .chain(info.unconfirmed_txrefs.unwrap_or_default())
            .map(|txref| txref.into_output(self.network))
            .collect()
    }
}

impl Default for BlockCypher {
    fn default() -> Self {
        BlockCypher::new()
    }
}

#[derive(Debug, Deserialize)]
struct BlockCypherAddress {
    #[serde(default)]
    txrefs: Option<Vec<BlockCypherTxRef>>,
    #[serde(default)]
    unconfirmed_txrefs: Option<Vec<BlockCypherTxRef>>,
}

#[derive(Debug, Deserialize)]
struct BlockCypherTxRef {
    tx_hash: String,
    tx_output_n: u32,
    value: Value,
    script: Option<String>,
}

impl BlockCypherTxRef {
    fn into_output(self, network: Network) -> Result<UnspentOutput> {
        let txid = Txid::from_str(&self.tx_hash).map_err(|_| {
            ExplorerError::MalformedResponse(format!("txref tx_hash: `{}`", self.tx_hash))
        })?;

        let script_hex = self
            .script
            .ok_or_else(|| ExplorerError::MalformedResponse("txref without a script".into()))?;
        let script = ScriptBuf::from_hex(&script_hex).map_err(|_| {
            ExplorerError::MalformedResponse(format!("txref script: `{}`", script_hex))
        })?;

        Ok(UnspentOutput::new(
            txid,
            self.tx_output_n,
            satoshis_from_json("value", &self.value)?,
            script,
            network,
        ))
    }
}

#[async_trait]
impl Explorer for BlockCypher {
    fn name(&self) -> &str {
        "blockcypher"
    }

    async fn fetch_unspent_outputs(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>> {
        check_addresses(addresses)?;
        debug!("blockcypher utxo lookup addresses={}", addresses.len());

        // One request per address, all in flight at once, flattened in the
        // order the addresses were given.
        let results = join_all(addresses.iter().map(|address| self.address_utxos(address))).await;

        let mut outputs = Vec::new();
        for result in results {
            outputs.extend(result?);
        }

        Ok(outputs)
    }

    async fn broadcast(&self, raw_tx: &str) -> Result<Txid> {
        check_raw_tx(raw_tx)?;
        debug!("blockcypher broadcast bytes={}", raw_tx.len() / 2);

        let response = self
            .transport
            .post_json(&format!("{}/tx/push", self.url), &json!({ "tx": raw_tx }))
            .await?;
        // BlockCypher acknowledges a pushed transaction with 201, not 200.
        let body = response.require_status(201)?;

        parse_broadcast_txid(&body, "hash")
    }
}
