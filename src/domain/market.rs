//! Market Value Helpers
//!
//! Formatting and parsing of market caps and multipliers, plus contract
//! address validation.

/// Minimum length of a base58 contract address
pub const MIN_CONTRACT_LEN: usize = 32;
/// Maximum length of a base58 contract address
pub const MAX_CONTRACT_LEN: usize = 44;

/// Check that a contract looks like a base58 public key (32–44 chars).
///
/// Base58 excludes `0`, `O`, `I` and `l`; anything containing them fails to
/// decode.
pub fn is_valid_contract(contract: &str) -> bool {
    let len = contract.len();
    if !(MIN_CONTRACT_LEN..=MAX_CONTRACT_LEN).contains(&len) {
        return false;
    }
    bs58::decode(contract).into_vec().is_ok()
}

/// Format a dollar market cap for display.
///
/// - `>= 1,000,000` → `$2.50M`
/// - `>= 1,000` → `$1.5K`
/// - otherwise whole dollars, `$500`
pub fn format_market_cap(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${:.0}", value)
    }
}

/// Format a peak multiplier: one decimal at or above 1x, two below.
pub fn format_multiplier(multiplier: f64) -> String {
    if multiplier >= 1.0 {
        format!("{:.1}x", multiplier)
    } else {
        format!("{:.2}x", multiplier)
    }
}

/// Parse an entry market cap that may be raw (`"45000"`) or formatted
/// (`"$45.6K"`, `"$1.2M"`, `"1,250,000"`).
///
/// Returns `None` for anything that does not yield a positive finite number.
pub fn parse_market_cap(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    let (number, scale) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'b' | 'B' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    let value = number.parse::<f64>().ok()? * scale;
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_format_market_cap_thresholds() {
        assert_eq!(format_market_cap(500.0), "$500");
        assert_eq!(format_market_cap(1_500.0), "$1.5K");
        assert_eq!(format_market_cap(2_500_000.0), "$2.50M");
        assert_eq!(format_market_cap(45_600.0), "$45.6K");
        assert_eq!(format_market_cap(1_234_567.0), "$1.23M");
        assert_eq!(format_market_cap(789.0), "$789");
        assert_eq!(format_market_cap(999.4), "$999");
        assert_eq!(format_market_cap(0.0), "$0");
    }

    #[test]
    fn test_format_multiplier() {
        assert_eq!(format_multiplier(3.0), "3.0x");
        assert_eq!(format_multiplier(0.85), "0.85x");
        assert_eq!(format_multiplier(1.0), "1.0x");
        assert_eq!(format_multiplier(12.345), "12.3x");
    }

    #[test]
    fn test_valid_contract() {
        let mint = "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr";
        assert_eq!(mint.len(), 44);
        assert!(is_valid_contract(mint));
        assert!(is_valid_contract("So11111111111111111111111111111111111111112"));
    }

    #[test]
    fn test_invalid_contract_characters() {
        // Same length as a real mint, each with one excluded character
        let base = "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr";
        for bad in ['0', 'O', 'I', 'l'] {
            let mut candidate = base[..43].to_string();
            candidate.push(bad);
            assert!(!is_valid_contract(&candidate), "{} should be rejected", candidate);
        }
    }

    #[test]
    fn test_invalid_contract_length() {
        assert!(!is_valid_contract("7GCihgDB8fe6KNjn2MYt"));
        assert!(!is_valid_contract(""));
        assert!(!is_valid_contract(&"1".repeat(45)));
    }

    #[test]
    fn test_parse_market_cap() {
        assert_relative_eq!(parse_market_cap("45000").unwrap(), 45_000.0);
        assert_relative_eq!(parse_market_cap("$45.6K").unwrap(), 45_600.0, epsilon = 1e-6);
        assert_relative_eq!(parse_market_cap("$1.2M").unwrap(), 1_200_000.0, epsilon = 1e-6);
        assert_relative_eq!(parse_market_cap("1,250,000").unwrap(), 1_250_000.0);
        assert_relative_eq!(parse_market_cap(" $2b ").unwrap(), 2_000_000_000.0);
    }

    #[test]
    fn test_parse_market_cap_rejects_unknown() {
        assert!(parse_market_cap("N/A").is_none());
        assert!(parse_market_cap("").is_none());
        assert!(parse_market_cap("$").is_none());
        assert!(parse_market_cap("0").is_none());
        assert!(parse_market_cap("-500").is_none());
        assert!(parse_market_cap("—").is_none());
    }
}
