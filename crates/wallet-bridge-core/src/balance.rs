//! Wei to display-unit conversion.

use alloy::primitives::U256;

use crate::domain::NetworkConfig;

const WEI_DECIMALS: u64 = 18;
const DISPLAY_DECIMALS: u64 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedBalance {
    pub formatted: String,
    pub symbol: String,
}

pub fn format_balance(hex_wei: &str, network: &NetworkConfig) -> FormattedBalance {
    FormattedBalance {
        formatted: format_wei_hex(hex_wei),
        symbol: network.currency_symbol.clone(),
    }
}

/// Formats a `0x` hex wei quantity with at most six fractional digits.
/// Malformed input degrades to `"0"`.
pub fn format_wei_hex(hex_wei: &str) -> String {
    match parse_wei_hex(hex_wei) {
        Ok(wei) => format_wei(wei),
        Err(reason) => {
            tracing::warn!(input = hex_wei, %reason, "balance parse failed, reporting 0");
            "0".to_owned()
        }
    }
}

pub fn parse_wei_hex(hex_wei: &str) -> Result<U256, String> {
    let digits = hex_wei
        .strip_prefix("0x")
        .or_else(|| hex_wei.strip_prefix("0X"))
        .ok_or_else(|| format!("missing 0x prefix: {hex_wei:?}"))?;
    // from_str_radix tolerates '_' separators
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(format!("invalid hex digit {bad:?} in {hex_wei:?}"));
    }
    U256::from_str_radix(&format!("0{digits}"), 16).map_err(|e| format!("invalid hex quantity: {e}"))
}

pub fn format_wei(wei: U256) -> String {
    let unit = U256::from(10u64).pow(U256::from(WEI_DECIMALS));
    let step = U256::from(10u64).pow(U256::from(WEI_DECIMALS - DISPLAY_DECIMALS));
    let display_unit = U256::from(10u64).pow(U256::from(DISPLAY_DECIMALS));

    let (mut whole, rem) = wei.div_rem(unit);
    // round half away from zero at the sixth fractional digit
    let mut frac = (rem + step / U256::from(2u64)) / step;
    if frac >= display_unit {
        frac -= display_unit;
        whole += U256::from(1u64);
    }

    let fixed = format!("{whole}.{:0>width$}", frac.to_string(), width = DISPLAY_DECIMALS as usize);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}
