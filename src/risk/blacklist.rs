//! Token safety check

use std::collections::HashSet;
use crate::types::TokenPair;

/// Returns the first blacklisted token of the pair, if any. Symbols are
/// matched case-insensitively against the configured set.
pub fn blacklisted_token(blacklist: &HashSet<String>, pair: &TokenPair) -> Option<String> {
    for token in [&pair.base, &pair.quote] {
        if blacklist.contains(&token.to_uppercase()) {
            return Some(token.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_either_leg_token() {
        let blacklist: HashSet<String> = ["SCAM".to_string()].into_iter().collect();
        assert_eq!(
            blacklisted_token(&blacklist, &TokenPair::new("SCAM", "USDC")),
            Some("SCAM".to_string())
        );
        assert_eq!(
            blacklisted_token(&blacklist, &TokenPair::new("WETH", "scam")),
            Some("scam".to_string())
        );
        assert_eq!(blacklisted_token(&blacklist, &TokenPair::new("WETH", "USDC")), None);
    }
}
