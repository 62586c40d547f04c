use std::str::FromStr;

use bitcoin::BlockHash;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ExplorerError, Result};

/// Summary of a mined block as listed by an Insight server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub hash: BlockHash,
    pub height: u32,
    pub size: u64,
    /// Unix seconds.
    pub time: u64,
    pub tx_length: u32,
    /// Mining pool attribution, kept opaque.
    pub pool_info: Value,
}

#[derive(Debug, Deserialize)]
struct InsightBlock {
    hash: String,
    height: u32,
    size: u64,
    time: u64,
    txlength: u32,
    #[serde(rename = "poolInfo")]
    pool_info: Value,
}

impl BlockHeader {
    pub fn from_insight(value: &Value) -> Result<Self> {
        let raw: InsightBlock = serde_json::from_value(value.clone())
            .map_err(|e| ExplorerError::MalformedResponse(format!("block header: {}", e)))?;

        let hash = BlockHash::from_str(&raw.hash).map_err(|_| {
            ExplorerError::MalformedResponse(format!("block hash: `{}`", raw.hash))
        })?;
        if !raw.pool_info.is_object() {
            return Err(ExplorerError::MalformedResponse(
                "block header poolInfo is not an object".into(),
            ));
        }

        Ok(BlockHeader {
            hash,
            height: raw.height,
            size: raw.size,
            time: raw.time,
            tx_length: raw.txlength,
            pool_info: raw.pool_info,
        })
    }

    pub fn from_insight_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ExplorerError::MalformedResponse(format!("block header: {}", e)))?;

        Self::from_insight(&value)
    }
}
