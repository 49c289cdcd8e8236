//! Price string cleanup.

/// Currency symbol stripped from the front of price strings.
pub const CURRENCY_SYMBOL: char = '$';

/// Remove a single leading `$` from a price string.
///
/// The remainder is not validated; strings without the symbol are returned
/// unchanged.
pub fn strip_currency_symbol(price: &str) -> &str {
    price.strip_prefix(CURRENCY_SYMBOL).unwrap_or(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_only_one_symbol() {
        assert_eq!(strip_currency_symbol("$$5"), "$5");
    }

    #[test]
    fn symbol_in_the_middle_is_kept() {
        assert_eq!(strip_currency_symbol("USD $5"), "USD $5");
    }
}
