use std::str::FromStr;

use async_trait::async_trait;
use bitcoin::{Address, Network, ScriptBuf, Txid};
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ExplorerError, Result};
use crate::explorer::{check_addresses, check_raw_tx, parse_broadcast_txid, Explorer};
use crate::models::numeric::{satoshis_from_btc_json, satoshis_from_json};
use crate::models::{AddressSummary, BlockHeader, FeeEstimation, UnspentOutput};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::DEFAULT_NETWORK;

const MAINNET_URL: &str = "https://insight.bitpay.com";
const TESTNET_URL: &str = "https://test-insight.bitpay.com";

/// Client for an Insight block explorer server.
pub struct Insight {
    url: String,
    network: Network,
    transport: Box<dyn HttpTransport>,
}

impl Insight {
    pub fn new() -> Self {
        Insight::for_network(DEFAULT_NETWORK)
    }

    pub fn for_network(network: Network) -> Self {
        let url = match network {
            Network::Bitcoin => MAINNET_URL,
            _ => TESTNET_URL,
        };

        Insight::with_url(url, network)
    }

    pub fn with_url(url: impl Into<String>, network: Network) -> Self {
        Insight::with_transport(url, network, Box::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        url: impl Into<String>,
        network: Network,
        transport: Box<dyn HttpTransport>,
    ) -> Self {
        Insight {
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

    async fn request_get(&self, path: &str) -> Result<String> {
        let response = self.transport.get(&format!("{}{}", self.url, path)).await?;
        response.require_status(200)
    }

    async fn request_post(&self, path: &str, body: &Value) -> Result<String> {
        let response = self
            .transport
            .post_json(&format!("{}{}", self.url, path), body)
            .await?;
        response.require_status(200)
    }

    /// Block summaries for a given day, newest first, as listed by
    /// `/api/blocks`. `block_date` uses the server's `YYYY-MM-DD` format.
    pub async fn get_block_headers(
        &self,
        block_date: &str,
        limit: u32,
    ) -> Result<Vec<BlockHeader>> {
        let body = self
            .request_get(&format!(
                "/api/blocks?blockDate={}&limit={}",
                block_date, limit
            ))
            .await?;

        parse_block_list(&body)
    }

    /// Median timestamp of the last eleven blocks the server knows about.
    pub async fn get_median_time(&self) -> Result<u64> {
        let body = self.request_get("/api/blocks?limit=11").await?;

        median_time(&parse_block_list(&body)?)
    }

    pub async fn address_summary(&self, address: &Address) -> Result<AddressSummary> {
        let body = self.request_get(&format!("/api/addr/{}", address)).await?;

        AddressSummary::from_insight_str(&body)
    }

    pub async fn fee_estimation(&self, within_blocks: u32) -> Result<FeeEstimation> {
        if within_blocks == 0 {
            return Err(ExplorerError::Argument(
                "confirmation horizon must be positive".into(),
            ));
        }

        let body = self
            .request_get(&format!("/api/utils/estimatefee?nbBlocks={}", within_blocks))
            .await?;

        FeeEstimation::from_insight_str(&body)
    }
}

impl Default for Insight {
    fn default() -> Self {
        Insight::new()
    }
}

/// Median of exactly eleven block timestamps: sort ascending, take the 6th
/// (index 5). Anything other than eleven headers is an argument error.
pub fn median_time(headers: &[BlockHeader]) -> Result<u64> {
    if headers.len() != 11 {
        return Err(ExplorerError::Argument(format!(
            "median time needs exactly 11 block headers, got {}",
            headers.len()
        )));
    }

    let mut times = headers.iter().map(|header| header.time).collect::<Vec<_>>();
    times.sort_unstable();

    Ok(times[times.len() / 2])
}

fn parse_block_list(body: &str) -> Result<Vec<BlockHeader>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ExplorerError::MalformedResponse(format!("block list: {}", e)))?;
    let blocks = value["blocks"]
        .as_array()
        .ok_or_else(|| {
            ExplorerError::MalformedResponse("block list has no `blocks` array".into())
        })?;

    blocks.iter().map(BlockHeader::from_insight).collect()
}

#[derive(Debug, Deserialize)]
struct InsightUtxo {
    txid: String,
    vout: u32,
    #[serde(rename = "scriptPubKey")]
    script_pub_key: Option<String>,
    satoshis: Option<Value>,
    amount: Option<Value>,
}

impl InsightUtxo {
    fn into_output(self, network: Network) -> Result<UnspentOutput> {
        let txid = Txid::from_str(&self.txid)
            .map_err(|_| ExplorerError::MalformedResponse(format!("utxo txid: `{}`", self.txid)))?;

        let script_hex = self
            .script_pub_key
            .ok_or_else(|| {
                ExplorerError::MalformedResponse("utxo without a locking script".into())
            })?;
        let script = ScriptBuf::from_hex(&script_hex).map_err(|_| {
            ExplorerError::MalformedResponse(format!("utxo locking script: `{}`", script_hex))
        })?;

        let satoshis = match (&self.satoshis, &self.amount) {
            (Some(value), _) => satoshis_from_json("satoshis", value)?,
            (None, Some(value)) => satoshis_from_btc_json("amount", value)?,
            (None, None) => {
                return Err(ExplorerError::MalformedResponse("utxo without a value".into()))
            }
        };

        Ok(UnspentOutput::new(txid, self.vout, satoshis, script, network))
    }
}

#[async_trait]
impl Explorer for Insight {
    fn name(&self) -> &str {
        "insight"
    }

    async fn fetch_unspent_outputs(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>> {
        check_addresses(addresses)?;

        let addrs = addresses
            .iter()
            .map(|address| address.to_string())
            .collect::<Vec<_>>()
            .join(",");
        debug!("insight utxo lookup addrs={}", addrs);

        let body = self
            .request_post("/api/addrs/utxo", &json!({ "addrs": addrs }))
            .await?;
        let utxos: Vec<InsightUtxo> = serde_json::from_str(&body)
            .map_err(|e| ExplorerError::MalformedResponse(format!("utxo list: {}", e)))?;

        utxos
            .into_iter()
            .map(|utxo| utxo.into_output(self.network))
            .collect()
    }

    async fn broadcast(&self, raw_tx: &str) -> Result<Txid> {
        check_raw_tx(raw_tx)?;
        debug!("insight broadcast bytes={}", raw_tx.len() / 2);

        let body = self
            .request_post("/api/tx/send", &json!({ "rawtx": raw_tx }))
            .await?;

        parse_broadcast_txid(&body, "txid")
    }
}
