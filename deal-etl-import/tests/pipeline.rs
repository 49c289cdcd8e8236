use std::path::Path;

use chrono::NaiveDate;
use deal_etl_db::*;
use deal_etl_import::*;
use rust_decimal::Decimal;
use serde_json::json;

const DEALS: &str = r#"[
    {"name": "Foo", "link": "https://store.steampowered.com/app/10/Foo/",
     "original price": "$19.99", "discounted price": "$4.99",
     "review": "Very Positive", "recent review": null,
     "offer ends": "Offer ends 25 December", "release date": "Jun 5, 2023"},
    {"name": null, "link": "https://store.steampowered.com/app/11/Nameless/"},
    {"name": "Bar", "link": "https://store.steampowered.com/app/12/Bar/",
     "original price": "$9.99", "discounted price": "$1.99",
     "release date": "Mar 2021"}
]"#;

const LINKS: &str = r#"[
    {"app_id": 10, "link": "https://store.steampowered.com/app/10/Foo/", "name": "Foo",
     "tag": "Indie", "category": "Single-player", "developer": "Acme",
     "support windows": true, "support mac": false, "support linux": false, "support vr": false}
]"#;

const REVIEWS: &str = r#"
{"appid": 10, "steamid": "76561198000000001", "total_playtime": 600, "playtime_at_review": 300, "last_play_time": 1700000000, "recommended": true, "helpful_vote": 2, "funny_vote": 0, "weighted_vote_score": 0.523809552192688, "content": "Great", "created_time": 1699990000, "last_updated": 1699990000}
{"appid": 12, "steamid": "76561198000000002", "recommended": false, "weighted_vote_score": 0, "content": "Meh"}
"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

fn write_inputs(dir: &Path) -> InputPaths {
    std::fs::write(dir.join("deal.json"), DEALS).unwrap();
    std::fs::write(dir.join("link.json"), LINKS).unwrap();
    std::fs::write(dir.join("reviews.json"), REVIEWS).unwrap();
    InputPaths::in_dir(dir)
}

fn settings(dir: &Path) -> PipelineSettings {
    PipelineSettings {
        inputs: write_inputs(dir),
        store: StoreConfig {
            database_path: dir.join("store.db"),
            ..StoreConfig::default()
        },
        ..PipelineSettings::default()
    }
}

#[test]
fn transform_joins_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let raw = extract(&write_inputs(dir.path())).unwrap();
    let out = transform(raw, &NormalizeOptions::new(today())).unwrap();

    assert_eq!(out.deals.len(), 2);
    assert_eq!(out.games.len(), 2);
    assert_eq!(out.reviews.len(), 2);
    assert_eq!(out.stats.deals_read, 3);
    assert_eq!(out.stats.deals_dropped, 1);
    assert_eq!(out.stats.join.matched, 1);
    assert_eq!(out.stats.join.missed, 1);

    assert_eq!(out.games[0].developer(), Some(&json!("Acme")));
    assert!(out.games[1].catalog.is_none());
    assert_eq!(out.deals[1].timestamp, "Offer ends in");
    assert_eq!(out.deals[1].release_date.as_deref(), Some("2021-03-01T00:00:00"));
}

#[test]
fn run_into_memory_store() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut store = MemoryStore::new();

    let summary = run(&settings, &mut store, today(), &SilentProgress).unwrap();
    assert_eq!(summary.load.games, 2);
    assert_eq!(summary.load.deals, 2);
    assert_eq!(summary.load.reviews, 2);
    assert_eq!(summary.load.skipped, 0);

    let deal = store.get("deal", "10", "4.99").unwrap();
    assert_eq!(deal["end_date"], AttributeValue::string("2024-12-25T00:00:00"));

    let game = store.get("game", "10", "Foo").unwrap();
    assert_eq!(game["tag"], AttributeValue::string("Indie"));
    assert_eq!(game["support_windows"], AttributeValue::Bool(true));
    assert_eq!(game["recent_review"], AttributeValue::string("No Review"));
    assert_eq!(game["original_price"], AttributeValue::string("19.99"));
    assert_eq!(game["release_date"], AttributeValue::string("2023-06-05T00:00:00"));

    let miss = store.get("game", "12", "Bar").unwrap();
    assert_eq!(miss["tag"], AttributeValue::Null);
    assert_eq!(miss["developer"], AttributeValue::Null);

    let review = store.get("reviews", "10", "76561198000000001").unwrap();
    assert_eq!(review["total_playtime"], AttributeValue::N("600".into()));
    assert_eq!(
        review["weighted_vote_score"],
        AttributeValue::from("0.523809552192688".parse::<Decimal>().unwrap())
    );
    assert_eq!(review["last_play_time"], AttributeValue::string("2023-11-14T22:13:20"));
    assert_eq!(review["recommended"], AttributeValue::Bool(true));
}

#[test]
fn run_into_sqlite_and_log() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut store = SqliteStore::open(&settings.store).unwrap();

    let summary = run(&settings, &mut store, today(), &LogProgress).unwrap();
    log_run(store.connection(), &settings, &summary).unwrap();

    let conn = store.connection();
    assert_eq!(count_items(conn, "game").unwrap(), 2);
    assert_eq!(count_items(conn, "deal").unwrap(), 2);
    assert_eq!(count_items(conn, "reviews").unwrap(), 2);
    assert_eq!(list_tables(conn).unwrap().len(), 3);

    let runs = list_runs(conn, 5).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].join_misses, 1);
    assert_eq!(runs[0].games_loaded, 2);
}

#[test]
fn rerun_overwrites_items() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut store = SqliteStore::open(&settings.store).unwrap();
    run(&settings, &mut store, today(), &SilentProgress).unwrap();
    run(&settings, &mut store, today(), &SilentProgress).unwrap();
    assert_eq!(count_items(store.connection(), "game").unwrap(), 2);
}

#[test]
fn malformed_link_aborts_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    std::fs::write(
        &settings.inputs.deal,
        r#"[{"name": "Foo", "link": "https://store.steampowered.com/bundle/"}]"#,
    )
    .unwrap();

    let mut store = MemoryStore::new();
    let err = run(&settings, &mut store, today(), &SilentProgress).unwrap_err();
    assert!(matches!(err, ImportError::MalformedLink { .. }));
    assert!(!store.has_table("game"));
}

#[test]
fn malformed_link_skipped_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    settings.skip_malformed_links = true;
    std::fs::write(
        &settings.inputs.deal,
        r#"[{"name": "Foo", "link": "https://store.steampowered.com/bundle/", "discounted price": "$1"},
            {"name": "Bar", "link": "/12/", "discounted price": "$2"}]"#,
    )
    .unwrap();

    let mut store = MemoryStore::new();
    let summary = run(&settings, &mut store, today(), &SilentProgress).unwrap();
    assert_eq!(summary.transform.deals_skipped, 1);
    assert_eq!(summary.load.deals, 1);
}

#[test]
fn deals_without_price_are_skipped_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    std::fs::write(&settings.inputs.deal, r#"[{"name": "Foo", "link": "/10/"}]"#).unwrap();

    let mut store = MemoryStore::new();
    let summary = run(&settings, &mut store, today(), &SilentProgress).unwrap();
    assert_eq!(summary.load.deals, 0);
    assert_eq!(summary.load.games, 1);
    assert_eq!(summary.load.skipped, 1);
}

#[test]
fn create_tables_provisions_three() {
    let mut store = MemoryStore::new();
    create_tables(&mut store, &StoreConfig::default()).unwrap();
    for table in ["deal", "game", "reviews"] {
        assert!(store.has_table(table));
    }
}
