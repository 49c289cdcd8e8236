use deal_etl_catalog::price::strip_currency_symbol;

#[test]
fn strips_dollar() {
    assert_eq!(strip_currency_symbol("$19.99"), "19.99");
}

#[test]
fn plain_number_unchanged() {
    assert_eq!(strip_currency_symbol("19.99"), "19.99");
}

#[test]
fn free_unchanged() {
    assert_eq!(strip_currency_symbol("Free"), "Free");
}

#[test]
fn empty_unchanged() {
    assert_eq!(strip_currency_symbol(""), "");
}
