use std::str::FromStr;

use bitcoin::Txid;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ExplorerError, Result};
use crate::models::numeric::satoshis_from_json;

/// Balance and history summary for a single address, as reported by an
/// Insight server. Amounts are satoshis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSummary {
    pub address: String,
    pub balance: u64,
    pub total_received: u64,
    pub total_sent: u64,
    pub unconfirmed_balance: u64,
    pub transaction_ids: Vec<Txid>,
}

#[derive(Debug, Deserialize)]
struct InsightAddress {
    #[serde(rename = "addrStr")]
    addr_str: String,
    #[serde(rename = "balanceSat")]
    balance_sat: Value,
    #[serde(rename = "totalReceivedSat")]
    total_received_sat: Value,
    #[serde(rename = "totalSentSat")]
    total_sent_sat: Value,
    #[serde(rename = "unconfirmedBalanceSat")]
    unconfirmed_balance_sat: Value,
    #[serde(default)]
    transactions: Vec<String>,
}

impl AddressSummary {
    pub fn from_insight(value: &Value) -> Result<Self> {
        let raw: InsightAddress = serde_json::from_value(value.clone())
            .map_err(|e| ExplorerError::MalformedResponse(format!("address summary: {}", e)))?;

        let transaction_ids = raw
            .transactions
            .iter()
            .map(|id| {
                Txid::from_str(id).map_err(|_| {
                    ExplorerError::MalformedResponse(format!("address summary txid: `{}`", id))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(AddressSummary {
            address: raw.addr_str,
            balance: satoshis_from_json("balanceSat", &raw.balance_sat)?,
            total_received: satoshis_from_json("totalReceivedSat", &raw.total_received_sat)?,
            total_sent: satoshis_from_json("totalSentSat", &raw.total_sent_sat)?,
            unconfirmed_balance: satoshis_from_json(
                "unconfirmedBalanceSat",
                &raw.unconfirmed_balance_sat,
            )?,
            transaction_ids,
        })
    }

    pub fn from_insight_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ExplorerError::MalformedResponse(format!("address summary: {}", e)))?;

        Self::from_insight(&value)
    }
}
