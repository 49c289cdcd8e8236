use deal_etl_catalog::{DealRecord, LinkRecord};
use deal_etl_import::*;
use serde_json::json;

fn deal(app_id: i64, link: &str, name: &str) -> DealRecord {
    serde_json::from_value(json!({
        "app_id": app_id,
        "name": name,
        "link": link,
        "review": "No Review",
        "recent_review": "No Review",
        "offer_ends": "Offer ends in",
        "timestamp": "Offer ends in",
    }))
    .unwrap()
}

fn link(app_id: i64, link: &str, name: &str, tag: &str) -> LinkRecord {
    serde_json::from_value(json!({
        "app_id": app_id, "link": link, "name": name, "tag": tag
    }))
    .unwrap()
}

#[test]
fn matching_deal_gets_catalog_fields() {
    let deals = [deal(10, "/10/", "Foo")];
    let links = [link(10, "/10/", "Foo", "Indie")];
    let (games, stats) = left_join(&deals, &links);
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].tag(), Some(&json!("Indie")));
    assert_eq!(stats.matched, 1);
    assert_eq!(stats.missed, 0);
}

#[test]
fn unmatched_deal_is_retained() {
    let deals = [deal(10, "/10/", "Foo"), deal(11, "/11/", "Bar")];
    let links = [link(10, "/10/", "Foo", "Indie")];
    let (games, stats) = left_join(&deals, &links);
    assert_eq!(games.len(), 2);
    assert_eq!(games[1].deal.name, "Bar");
    assert!(games[1].catalog.is_none());
    assert!(games[1].tag().is_none());
    assert_eq!(stats.missed, 1);
}

#[test]
fn all_key_columns_must_match() {
    let deals = [deal(10, "/10/", "Foo")];
    let links = [
        link(11, "/10/", "Foo", "wrong id"),
        link(10, "/10/Foo/", "Foo", "wrong link"),
        link(10, "/10/", "foo", "wrong name"),
    ];
    let (games, stats) = left_join(&deals, &links);
    assert_eq!(games.len(), 1);
    assert!(games[0].catalog.is_none());
    assert_eq!(stats.missed, 1);
}

#[test]
fn duplicate_catalog_entries_fan_out() {
    let deals = [deal(10, "/10/", "Foo"), deal(12, "/12/", "Baz")];
    let links = [
        link(10, "/10/", "Foo", "Indie"),
        link(12, "/12/", "Baz", "RPG"),
        link(10, "/10/", "Foo", "Action"),
    ];
    let (games, stats) = left_join(&deals, &links);
    let tags: Vec<_> = games.iter().map(|g| g.tag().unwrap().clone()).collect();
    assert_eq!(tags, vec![json!("Indie"), json!("Action"), json!("RPG")]);
    assert_eq!(stats.fanned_out, 1);
    assert_eq!(stats.matched, 2);
}

#[test]
fn catalog_entry_without_key_never_matches() {
    let deals = [deal(10, "/10/", "Foo")];
    let keyless: LinkRecord =
        serde_json::from_value(json!({ "link": "/10/", "name": "Foo", "tag": "Indie" })).unwrap();
    let (games, _) = left_join(&deals, &[keyless]);
    assert!(games[0].catalog.is_none());
}

#[test]
fn deal_order_is_preserved() {
    let deals: Vec<_> = (0..5)
        .map(|i| deal(i, &format!("/{i}/"), &format!("G{i}")))
        .collect();
    let links = [link(3, "/3/", "G3", "x"), link(1, "/1/", "G1", "y")];
    let (games, _) = left_join(&deals, &links);
    let ids: Vec<_> = games.iter().map(|g| g.deal.app_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn empty_inputs() {
    let (games, stats) = left_join(&[], &[]);
    assert!(games.is_empty());
    assert_eq!(stats, MergeStats::default());
}
