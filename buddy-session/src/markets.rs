//! Market suggestions offered by the form. Never enforced.

/// Suggested markets, in display order.
pub const MARKET_SUGGESTIONS: [&str; 10] = [
    "AI",
    "SaaS",
    "E-commerce",
    "Health",
    "Education",
    "FinTech",
    "Gaming",
    "Creator Economy",
    "Marketplace",
    "Developer Tools",
];

/// Returns `true` when `market` matches a suggestion, ignoring ASCII case.
#[must_use]
pub fn is_suggested(market: &str) -> bool {
    let market = market.trim();
    MARKET_SUGGESTIONS
        .iter()
        .any(|suggestion| suggestion.eq_ignore_ascii_case(market))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        assert!(is_suggested("fintech"));
        assert!(is_suggested(" Creator Economy "));
        assert!(!is_suggested("Space Mining"));
    }
}
