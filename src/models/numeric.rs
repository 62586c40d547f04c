use serde_json::Value;

use crate::error::{ExplorerError, Result};

const SATOSHIS_PER_BTC: f64 = 100_000_000.0;

// Explorers are loose about number encoding: the same satoshi amount can
// arrive as a JSON integer, a float, or a decimal string. Everything is
// normalized to exact u64 satoshis here; nothing fractional or negative
// may leave the adapter layer.
pub(crate) fn satoshis_from_json(field: &str, value: &Value) -> Result<u64> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_u64() {
                return Ok(int);
            }
            match number.as_f64() {
                // u64::MAX as f64 rounds up to 2^64, so the bound must stay strict.
                Some(float) if float >= 0.0 && float.fract() == 0.0 && float < u64::MAX as f64 => {
                    Ok(float as u64)
                }
                _ => Err(malformed(field, value)),
            }
        }
        Value::String(raw) => raw.trim().parse::<u64>().map_err(|_| malformed(field, value)),
        _ => Err(malformed(field, value)),
    }
}

pub(crate) fn satoshis_from_btc_json(field: &str, value: &Value) -> Result<u64> {
    let btc = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| malformed(field, value))?;

    btc_to_satoshis(btc).ok_or_else(|| malformed(field, value))
}

pub(crate) fn btc_to_satoshis(btc: f64) -> Option<u64> {
    if !btc.is_finite() || btc < 0.0 {
        return None;
    }

    let satoshis = (btc * SATOSHIS_PER_BTC).round();
    if satoshis >= u64::MAX as f64 {
        return None;
    }

    Some(satoshis as u64)
}

fn malformed(field: &str, value: &Value) -> ExplorerError {
    ExplorerError::MalformedResponse(format!("{} is not a valid amount: {}", field, value))
}
