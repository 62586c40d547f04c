use serde_json::Value;

use crate::error::{ExplorerError, Result};
use crate::models::numeric::satoshis_from_btc_json;

/// Fee rate estimate for confirmation within a target number of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimation {
    pub within_blocks: u32,
    /// Satoshis per kilobyte.
    pub fee_per_kb: u64,
}

impl FeeEstimation {
    // Insight replies with a single-entry object mapping the horizon to a
    // BTC/kB rate, e.g. `{"2": 0.00023}`. A negative rate is the server's
    // "no estimate available" marker and is rejected as malformed.
    pub fn from_insight(value: &Value) -> Result<Self> {
        let entries = value.as_object().ok_or_else(|| {
            ExplorerError::MalformedResponse(format!("fee estimation is not an object: {}", value))
        })?;
        let (horizon, rate) = entries.iter().next().ok_or_else(|| {
            ExplorerError::MalformedResponse("fee estimation object is empty".into())
        })?;

        let within_blocks = horizon.parse::<u32>().map_err(|_| {
            ExplorerError::MalformedResponse(format!("fee estimation horizon: `{}`", horizon))
        })?;
        if within_blocks == 0 {
            return Err(ExplorerError::MalformedResponse(
                "fee estimation horizon is zero".into(),
            ));
        }

        Ok(FeeEstimation {
            within_blocks,
            fee_per_kb: satoshis_from_btc_json("fee rate", rate)?,
        })
    }

    pub fn from_insight_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ExplorerError::MalformedResponse(format!("fee estimation: {}", e)))?;

        Self::from_insight(&value)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use crate::models::fee::*;

    #[test]
    fn test_converts_btc_per_kb_to_satoshis() {
        let estimation = FeeEstimation::from_insight(&json!({"2": 0.00023})).unwrap();

        assert_eq!(estimation.within_blocks, 2);
        assert_eq!(estimation.fee_per_kb, 23000);
    }

    #[test]
    fn test_parses_raw_string_payload() {
        let estimation = FeeEstimation::from_insight_str(r#"{"6": 0.000178}"#).unwrap();

        assert_eq!(estimation.within_blocks, 6);
        assert_eq!(estimation.fee_per_kb, 17800);
    }

    #[test]
    fn test_no_estimate_marker_is_malformed() {
        assert!(FeeEstimation::from_insight(&json!({"2": -1})).is_err());
    }

    #[test]
    fn test_bad_shapes_are_malformed() {
        assert!(FeeEstimation::from_insight(&json!({})).is_err());
        assert!(FeeEstimation::from_insight(&json!([1, 2])).is_err());
        assert!(FeeEstimation::from_insight(&json!({"soon": 0.0002})).is_err());
        assert!(FeeEstimation::from_insight(&json!({"0": 0.0002})).is_err());
    }
}
