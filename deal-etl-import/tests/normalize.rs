use chrono::NaiveDate;
use deal_etl_catalog::{Dataset, NO_REVIEW, OFFER_ENDS_SENTINEL, RawRecord};
use deal_etl_import::*;
use serde_json::{Value, json};

fn raw(v: Value) -> RawRecord {
    v.as_object().unwrap().clone()
}

fn options() -> NormalizeOptions {
    NormalizeOptions::new(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
}

fn raw_deal(name: Value, app_id: u32) -> RawRecord {
    raw(json!({
        "name": name,
        "link": format!("https://store.steampowered.com/app/{app_id}/Game/"),
        "original price": "$19.99",
        "discounted price": "$4.99",
        "review": "Very Positive",
        "recent review": "Mixed",
        "offer ends": "Offer ends 25 December",
        "release date": "Jun 5, 2023",
    }))
}

// ── Deals ───────────────────────────────────────────────────────────────────

#[test]
fn deal_full_record() {
    let out = normalize_deals(vec![raw_deal(json!("Foo"), 10)], &options()).unwrap();
    let deal = &out.records[0];
    assert_eq!(deal.app_id, 10);
    assert_eq!(deal.name, "Foo");
    assert_eq!(deal.original_price.as_deref(), Some("19.99"));
    assert_eq!(deal.discounted_price.as_deref(), Some("4.99"));
    assert_eq!(deal.review, "Very Positive");
    assert_eq!(deal.recent_review, "Mixed");
    assert_eq!(deal.offer_ends, "Offer ends 25 December");
    assert_eq!(deal.timestamp, "2024-12-25T00:00:00");
    assert_eq!(deal.release_date.as_deref(), Some("2023-06-05T00:00:00"));
    assert!(deal.extra.is_empty());
}

#[test]
fn deal_drops_missing_names_and_keeps_order() {
    let mut missing = raw_deal(json!("x"), 3);
    missing.remove("name");
    let records = vec![
        raw_deal(json!("A"), 1),
        raw_deal(Value::Null, 2),
        missing,
        raw_deal(json!("B"), 4),
        raw_deal(json!("C"), 5),
    ];
    let out = normalize_deals(records, &options()).unwrap();
    let names: Vec<_> = out.records.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(out.dropped, 2);
    assert_eq!(out.skipped, 0);
}

#[test]
fn deal_empty_name_is_kept() {
    let out = normalize_deals(vec![raw_deal(json!(""), 1)], &options()).unwrap();
    assert_eq!(out.records.len(), 1);
}

#[test]
fn deal_placeholders_for_missing_text() {
    let record = raw(json!({
        "name": "Foo",
        "link": "/10/",
        "review": null,
    }));
    let out = normalize_deals(vec![record], &options()).unwrap();
    let deal = &out.records[0];
    assert_eq!(deal.review, NO_REVIEW);
    assert_eq!(deal.recent_review, NO_REVIEW);
    assert_eq!(deal.offer_ends, OFFER_ENDS_SENTINEL);
    assert_eq!(deal.timestamp, OFFER_ENDS_SENTINEL);
    assert!(deal.original_price.is_none());
    assert!(deal.release_date.is_none());
}

#[test]
fn deal_existing_timestamp_is_canonicalized() {
    let mut record = raw_deal(json!("Foo"), 10);
    record.insert("timestamp".into(), json!("2024-03-01 10:00:00.600"));
    let out = normalize_deals(vec![record], &options()).unwrap();
    assert_eq!(out.records[0].timestamp, "2024-03-01T10:00:01");
}

#[test]
fn deal_timestamp_rolls_into_next_year() {
    let mut record = raw_deal(json!("Foo"), 10);
    record.insert("offer ends".into(), json!("Offer ends 5 January"));
    let out = normalize_deals(vec![record], &options()).unwrap();
    assert_eq!(out.records[0].timestamp, "2025-01-05T00:00:00");
}

#[test]
fn deal_offer_text_in_either_order() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let offers = [
        ("Offer ends 25 December", "2024-12-25T00:00:00"),
        ("Offer ends December 25", "2024-12-25T00:00:00"),
        ("Offer ends 15 June", "2024-06-15T00:00:00"),
        ("Offer ends June 15", "2024-06-15T00:00:00"),
        ("Offer ends 1 January", "2025-01-01T00:00:00"),
        ("Offer ends January 1", "2025-01-01T00:00:00"),
    ];
    let records = offers
        .iter()
        .enumerate()
        .map(|(i, (text, _))| {
            let mut record = raw_deal(json!(format!("Game {i}")), 100 + i as u32);
            record.insert("offer ends".into(), json!(text));
            record
        })
        .collect();
    let out = normalize_deals(records, &NormalizeOptions::new(today)).unwrap();
    assert_eq!(out.records.len(), offers.len());
    for (deal, (text, expected)) in out.records.iter().zip(offers) {
        assert_eq!(deal.offer_ends, text);
        assert_eq!(deal.timestamp, expected, "offer text {text:?}");
    }
}

#[test]
fn deal_unparseable_dates_pass_through() {
    let mut record = raw_deal(json!("Foo"), 10);
    record.insert("release date".into(), json!("Coming soon"));
    record.insert("offer ends".into(), json!("Limited time"));
    let out = normalize_deals(vec![record], &options()).unwrap();
    assert_eq!(out.records[0].release_date.as_deref(), Some("Coming soon"));
    assert_eq!(out.records[0].timestamp, "Limited time");
}

#[test]
fn deal_prices_without_symbol_unchanged() {
    let mut record = raw_deal(json!("Foo"), 10);
    record.insert("original price".into(), json!("Free"));
    record.insert("discounted price".into(), json!(2.5));
    let out = normalize_deals(vec![record], &options()).unwrap();
    assert_eq!(out.records[0].original_price.as_deref(), Some("Free"));
    assert_eq!(out.records[0].discounted_price.as_deref(), Some("2.5"));
}

#[test]
fn deal_app_id_overrides_export_value() {
    let mut record = raw_deal(json!("Foo"), 10);
    record.insert("app_id".into(), json!(999));
    let out = normalize_deals(vec![record], &options()).unwrap();
    assert_eq!(out.records[0].app_id, 10);
}

#[test]
fn deal_malformed_link_fails_the_set() {
    let mut bad = raw_deal(json!("Bad"), 0);
    bad.insert("link".into(), json!("https://store.steampowered.com/bundle/"));
    let records = vec![raw_deal(json!("Good"), 1), bad];
    let err = normalize_deals(records, &options()).unwrap_err();
    assert!(matches!(
        err,
        ImportError::MalformedLink {
            dataset: Dataset::Deal,
            index: 1,
            ..
        }
    ));
}

#[test]
fn deal_missing_link_fails_the_set() {
    let mut bad = raw_deal(json!("Bad"), 0);
    bad.remove("link");
    assert!(matches!(
        normalize_deals(vec![bad], &options()),
        Err(ImportError::MalformedLink { .. })
    ));
}

#[test]
fn deal_malformed_link_can_be_skipped() {
    let mut bad = raw_deal(json!("Bad"), 0);
    bad.insert("link".into(), json!("no-id-here"));
    let options = NormalizeOptions {
        skip_malformed_links: true,
        ..options()
    };
    let out = normalize_deals(vec![raw_deal(json!("Good"), 1), bad], &options).unwrap();
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.skipped, 1);
}

#[test]
fn deal_without_name_is_dropped_before_link_check() {
    let mut bad = raw_deal(Value::Null, 0);
    bad.insert("link".into(), json!("no-id-here"));
    let out = normalize_deals(vec![bad], &options()).unwrap();
    assert!(out.records.is_empty());
    assert_eq!(out.dropped, 1);
}

#[test]
fn deal_input_is_not_shared_with_output() {
    let record = raw_deal(json!("Foo"), 10);
    let original = record.clone();
    let _ = normalize_deals(vec![record.clone()], &options()).unwrap();
    assert_eq!(record, original);
}

// ── Reviews ─────────────────────────────────────────────────────────────────

#[test]
fn review_timestamps_and_names() {
    let record = raw(json!({
        "appid": 10,
        "steamid": "76561198000000000",
        "total_playtime": 1200,
        "last_play_time": 1_700_000_000,
        "created_time": "2023-11-14 22:13:20.4",
        "last_updated": "not a date",
        "weighted_vote_score": 0.5,
        "voted up": true,
    }));
    let out = normalize_reviews(vec![record], &options()).unwrap();
    let review = &out.records[0];
    assert_eq!(review.app_id, "10");
    assert_eq!(review.last_play_time.as_deref(), Some("2023-11-14T22:13:20"));
    assert_eq!(review.created_time.as_deref(), Some("2023-11-14T22:13:20"));
    assert_eq!(review.last_updated.as_deref(), Some("not a date"));
    assert_eq!(review.extra.get("voted_up"), Some(&json!(true)));
}

#[test]
fn review_missing_timestamps_stay_missing() {
    let record = raw(json!({ "app_id": 10, "steam_id": 1 }));
    let out = normalize_reviews(vec![record], &options()).unwrap();
    assert!(out.records[0].last_play_time.is_none());
}

#[test]
fn review_without_ids_is_invalid() {
    let record = raw(json!({ "content": "Great" }));
    let err = normalize_reviews(vec![record], &options()).unwrap_err();
    assert!(matches!(
        err,
        ImportError::InvalidRecord {
            dataset: Dataset::Review,
            index: 0,
            ..
        }
    ));
}

// ── Links ───────────────────────────────────────────────────────────────────

#[test]
fn link_only_field_names_change() {
    let record = raw(json!({
        "app_id": 10,
        "link": "/10/",
        "name": "Foo",
        "support windows": true,
        "release date": "Jun 5, 2023",
    }));
    let out = normalize_links(vec![record], &options()).unwrap();
    let link = &out.records[0];
    assert_eq!(link.fields.get("support_windows"), Some(&json!(true)));
    assert_eq!(link.fields.get("release_date"), Some(&json!("Jun 5, 2023")));
}

// ── Policies ────────────────────────────────────────────────────────────────

#[test]
fn deal_policy_table_shape() {
    let required: Vec<_> = DEAL_POLICIES
        .iter()
        .filter(|p| p.required)
        .map(|p| p.field)
        .collect();
    assert_eq!(required, vec!["name"]);

    let app_id = DEAL_POLICIES.iter().find(|p| p.field == "app_id").unwrap();
    assert_eq!(app_id.computed_from, Some("link"));

    assert_eq!(REVIEW_POLICIES.len(), 3);
}

#[test]
fn policies_on_a_single_record() {
    let ctx = RuleContext {
        today: NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
    };
    let out = apply_policies(
        raw(json!({ "name": "Foo", "link": "/10/", "offer_ends": "Offer ends 25 December" })),
        DEAL_POLICIES,
        &ctx,
    )
    .unwrap()
    .unwrap();
    assert_eq!(out["timestamp"], json!("2025-12-25T00:00:00"));
    assert_eq!(out["app_id"], json!(10));
}
