//! Hex and ABI decoding helpers for JSON-RPC payloads

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// Maximum length kept for decoded token names and symbols
const MAX_DECODED_STRING_LEN: usize = 50;

/// Convert a "0x"-prefixed hex quantity to u64, treating "0x", empty or
/// malformed values as zero
pub fn safe_hex_to_u64(hex_str: &str) -> u64 {
    let trimmed = hex_str.trim_start_matches("0x");
    if trimmed.is_empty() {
        return 0;
    }
    u64::from_str_radix(trimmed, 16).unwrap_or(0)
}

/// Parse a hex quantity of arbitrary width into a big unsigned integer
pub fn hex_to_biguint(hex_str: &str) -> Option<BigUint> {
    let trimmed = hex_str.trim_start_matches("0x");
    if trimmed.is_empty() {
        return Some(BigUint::zero());
    }
    BigUint::parse_bytes(trimmed.as_bytes(), 16)
}

/// Render a hex quantity as an exact decimal string ("0" on empty/malformed)
pub fn hex_to_decimal_string(hex_str: &str) -> String {
    hex_to_biguint(hex_str)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "0".to_string())
}

/// Decode an ABI-encoded dynamic string returned by eth_call.
///
/// Layout: 32-byte offset word, 32-byte length word, then the payload padded
/// with trailing zero bytes. Malformed data yields "Unknown" so a single bad
/// field never aborts a token probe.
pub fn decode_abi_string(hex_data: &str) -> String {
    let data = hex_data.trim_start_matches("0x");

    // Two full head words are required before any payload
    if data.len() < 128 {
        return "Unknown".to_string();
    }

    let payload = &data[128..];
    let bytes = match hex::decode(payload) {
        Ok(b) => b,
        Err(_) => return "Unknown".to_string(),
    };

    let mut trimmed = bytes;
    while trimmed.last() == Some(&0) {
        trimmed.pop();
    }
    match String::from_utf8(trimmed) {
        Ok(s) => s.chars().take(MAX_DECODED_STRING_LEN).collect(),
        Err(_) => "Unknown".to_string(),
    }
}

/// Format an integer with thousands separators
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a decimal-string supply scaled by its token decimals.
///
/// Values at or above a million render as "x.xM", above a thousand as "x.xK",
/// otherwise with two decimals. With zero decimals the raw integer is shown
/// with thousands separators. The input string is returned untouched when it
/// does not parse.
pub fn format_supply(supply_str: &str, decimals: u32) -> String {
    let supply = match BigUint::parse_bytes(supply_str.as_bytes(), 10) {
        Some(v) => v,
        None => return supply_str.to_string(),
    };

    if decimals == 0 {
        return match supply.to_u64() {
            Some(v) => format_number(v),
            None => supply.to_string(),
        };
    }

    let scaled = match supply.to_f64() {
        Some(v) => v / 10f64.powi(decimals as i32),
        None => return supply_str.to_string(),
    };

    if scaled >= 1_000_000.0 {
        format!("{:.1}M", scaled / 1_000_000.0)
    } else if scaled >= 1_000.0 {
        format!("{:.1}K", scaled / 1_000.0)
    } else {
        format!("{:.2}", scaled)
    }
}

/// Left-pad an address to a 32-byte word for ABI call data (no 0x prefix)
pub fn pad_address_for_call(address: &str) -> String {
    let stripped = address.trim_start_matches("0x");
    format!("{:0>64}", stripped.to_lowercase())
}

/// Check that a string is a plausible 20-byte hex address
pub fn is_valid_address(address: &str) -> bool {
    let stripped = match address.strip_prefix("0x") {
        Some(s) => s,
        None => return false,
    };
    stripped.len() == 40 && stripped.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_quantities_tolerate_empty_values() {
        assert_eq!(safe_hex_to_u64("0x"), 0);
        assert_eq!(safe_hex_to_u64(""), 0);
        assert_eq!(safe_hex_to_u64("0x1a"), 26);
        assert_eq!(hex_to_decimal_string("0x"), "0");
    }

    #[test]
    fn uint256_supply_is_not_truncated() {
        // 2^200, far beyond u128
        let hex = format!("0x{:x}", BigUint::from(2u8).pow(200));
        let decimal = hex_to_decimal_string(&hex);
        assert_eq!(decimal, BigUint::from(2u8).pow(200).to_string());
    }

    #[test]
    fn supply_formatting_scales_with_decimals() {
        assert_eq!(format_supply("1500000000000000000000", 18), "1.5K");
        assert_eq!(format_supply("500", 0), "500");
        assert_eq!(format_supply("2500000000000000000000000", 18), "2.5M");
        assert_eq!(format_supply("1230000000000000000", 18), "1.23");
        assert_eq!(format_supply("1234567", 0), "1,234,567");
    }

    fn encode_string_result(value: &str) -> String {
        let bytes = value.as_bytes();
        let mut padded = bytes.to_vec();
        while padded.len() % 32 != 0 {
            padded.push(0);
        }
        format!("0x{:064x}{:064x}{}", 0x20, bytes.len(), hex::encode(&padded))
    }

    #[test]
    fn well_formed_string_results_decode() {
        assert_eq!(decode_abi_string(&encode_string_result("Wrapped Ether")), "Wrapped Ether");
    }

    #[test]
    fn malformed_string_results_decode_as_unknown() {
        // No payload at all
        assert_eq!(decode_abi_string("0x"), "Unknown");
        // Truncated before the second head word
        assert_eq!(decode_abi_string(&format!("0x{:064x}", 0x20)), "Unknown");
        // Payload is not hex
        assert_eq!(decode_abi_string(&format!("0x{}zz", "0".repeat(128))), "Unknown");
        // Payload is not UTF-8
        let bad_utf8 = format!("0x{}{}", "0".repeat(128), "ff".repeat(32));
        assert_eq!(decode_abi_string(&bad_utf8), "Unknown");
    }

    #[test]
    fn oversized_names_are_capped() {
        let name = "A".repeat(80);
        let decoded = decode_abi_string(&encode_string_result(&name));
        assert_eq!(decoded.len(), 50);
        assert_eq!(decoded, "A".repeat(50));
    }

    #[test]
    fn balance_call_data_is_padded_to_a_word() {
        let padded = pad_address_for_call("0xAbC0000000000000000000000000000000000001");
        assert_eq!(padded.len(), 64);
        assert!(padded.starts_with("000000000000000000000000"));
        assert!(padded.ends_with("abc0000000000000000000000000000000000001"));
    }
}
