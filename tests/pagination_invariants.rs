//! Pagination Invariant Tests
//!
//! Cursor construction is driven by the effective limit the executed plan
//! recorded, never re-derived:
//! - `next` exists iff the page came back full and a `num` cap is not yet
//!   consumed
//! - `offset` advances by the effective limit
//! - every filter parameter round-trips verbatim into the next URL
//! - re-issuing a next URL yields a page disjoint from its predecessor

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use url::Url;

use geostac::catalog::{CatalogService, PageResult};
use geostac::filter::RawParams;
use geostac::geometry;
use geostac::query::ColumnMap;
use geostac::store::{Cell, MemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

fn unit_square_hex() -> String {
    let geom = geometry::parse_wkt("POLYGON((0 0,1 0,1 1,0 1,0 0))").unwrap();
    hex::encode(geometry::encode_wkb(&geom).unwrap())
}

fn item_row(index: usize) -> HashMap<String, Cell> {
    let start = ts(&format!("2023-05-01T{:02}:00:00", index));
    let mut row = HashMap::new();
    row.insert(
        "product_name".to_string(),
        Cell::Text(format!("VAR1_20230501_{:04}", index)),
    );
    row.insert("satellite_name".to_string(), Cell::Text("varuna-1".into()));
    row.insert("bounding_box_wkb".to_string(), Cell::Text(unit_square_hex()));
    row.insert("acquisition_start_utc".to_string(), Cell::Timestamp(start));
    row.insert(
        "acquisition_end_utc".to_string(),
        Cell::Timestamp(start + chrono::Duration::minutes(10)),
    );
    row.insert("center_lat".to_string(), Cell::Float(0.5));
    row.insert("center_lon".to_string(), Cell::Float(0.5));
    row.insert("orbit_direction".to_string(), Cell::Text("ASCENDING".into()));
    row.insert("polarization".to_string(), Cell::Text("VV".into()));
    row.insert("product_level".to_string(), Cell::Text("L1".into()));
    row.insert(
        "processing_time".to_string(),
        Cell::Timestamp(start + chrono::Duration::hours(1)),
    );
    row.insert(
        "assets".to_string(),
        Cell::Text(format!("s3://catalog/VAR1_{:04}.zip", index)),
    );
    row
}

fn seeded_service(rows: usize) -> CatalogService {
    let store = MemoryStore::new(ColumnMap::identity("items"), 100);
    for i in 0..rows {
        store.insert(item_row(i));
    }
    CatalogService::new(Arc::new(store), vec!["varuna-1".to_string()])
}

fn request_url(query: &str) -> Url {
    Url::parse(&format!("http://catalog.local/search?{}", query)).unwrap()
}

/// Rebuilds raw parameters from a URL the way the HTTP layer would.
fn raw_from_url(url: &Url) -> RawParams {
    let mut raw = RawParams::default();
    for (key, value) in url.query_pairs() {
        let value = value.into_owned();
        match key.as_ref() {
            "coordinates" => raw.coordinates = Some(value),
            "bbox" => raw.bbox = Some(value),
            "start_time" => raw.start_time = Some(value),
            "stop_time" => raw.stop_time = Some(value),
            "collectionId" => raw.collection = Some(value),
            "num" => raw.num = value.parse().ok(),
            "limit" => raw.limit = value.parse().ok(),
            "offset" => raw.offset = value.parse().ok(),
            _ => {}
        }
    }
    raw
}

fn product_ids(page: &PageResult) -> Vec<String> {
    page.products.iter().map(|p| p.id.clone()).collect()
}

// =============================================================================
// Next-Link Decision
// =============================================================================

/// Scenario: limit=2 over 3 rows pages as 2 + 1, then terminates.
#[tokio::test]
async fn test_two_page_walk_terminates() {
    let service = seeded_service(3);
    let url = request_url("limit=2");
    let raw = raw_from_url(&url);

    let page1 = service.search(&raw, &url).await.unwrap();
    assert_eq!(page1.total_count, 2);
    let next = page1.next.clone().expect("page 1 should have a next link");
    assert!(next.contains("offset=2"));
    assert!(next.contains("limit=2"));

    let next_url = Url::parse(&next).unwrap();
    let page2 = service
        .search(&raw_from_url(&next_url), &next_url)
        .await
        .unwrap();
    assert_eq!(page2.total_count, 1);
    assert!(page2.next.is_none());
}

/// A short page is terminal even when more offsets would be addressable.
#[tokio::test]
async fn test_short_page_has_no_next() {
    let service = seeded_service(5);
    let url = request_url("limit=10");
    let page = service.search(&raw_from_url(&url), &url).await.unwrap();
    assert_eq!(page.total_count, 5);
    assert!(page.next.is_none());
}

/// Exactly-full final page: the next link exists but its page is empty,
/// which surfaces as the not-found condition.
#[tokio::test]
async fn test_exact_boundary_next_page_is_empty() {
    let service = seeded_service(4);
    let url = request_url("limit=2&offset=2");
    let page = service.search(&raw_from_url(&url), &url).await.unwrap();
    assert_eq!(page.total_count, 2);
    let next = page.next.expect("full page carries a next link");

    let next_url = Url::parse(&next).unwrap();
    let result = service.search(&raw_from_url(&next_url), &next_url).await;
    assert!(result.is_err(), "drained cursor should report no results");
}

// =============================================================================
// Effective Limit (num vs limit)
// =============================================================================

/// For every num < limit the page size is num and the cap is terminal.
#[tokio::test]
async fn test_num_below_limit_caps_page_and_terminates() {
    let service = seeded_service(20);
    for (num, limit) in [(1u32, 7u32), (2, 5), (3, 10), (9, 10)] {
        let url = request_url(&format!("num={}&limit={}", num, limit));
        let page = service.search(&raw_from_url(&url), &url).await.unwrap();
        assert_eq!(page.total_count, num as usize, "num={} limit={}", num, limit);
        assert!(
            page.next.is_none(),
            "num={} limit={}: cap consumed on first page",
            num,
            limit
        );
    }
}

/// num above the page size allows paging but pins the consumed budget.
#[tokio::test]
async fn test_num_above_limit_pages_until_cap() {
    let service = seeded_service(20);
    let url = request_url("num=5&limit=2");

    let page1 = service.search(&raw_from_url(&url), &url).await.unwrap();
    assert_eq!(page1.total_count, 2);
    let next1 = Url::parse(&page1.next.unwrap()).unwrap();
    assert!(next1.as_str().contains("num=5"));

    let page2 = service.search(&raw_from_url(&next1), &next1).await.unwrap();
    assert_eq!(page2.total_count, 2);
    let next2 = Url::parse(&page2.next.unwrap()).unwrap();

    // Third page: offset 4, effective 2, 4 + 2 >= 5: terminal
    let page3 = service.search(&raw_from_url(&next2), &next2).await.unwrap();
    assert!(page3.next.is_none());
}

// =============================================================================
// Round-Trip and Disjointness
// =============================================================================

/// Every original parameter except offset/limit reappears unchanged.
#[tokio::test]
async fn test_filter_params_round_trip() {
    let service = seeded_service(10);
    let url = request_url(
        "collectionId=varuna-1&bbox=0,0,1,1&start_time=2023-05-01T00:00:00Z\
         &stop_time=2023-05-01T23:59:59Z&limit=3",
    );
    let page = service.search(&raw_from_url(&url), &url).await.unwrap();
    let next = Url::parse(&page.next.unwrap()).unwrap();

    let pairs: HashMap<String, String> = next
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(pairs.get("collectionId").map(String::as_str), Some("varuna-1"));
    assert_eq!(pairs.get("bbox").map(String::as_str), Some("0,0,1,1"));
    assert_eq!(
        pairs.get("start_time").map(String::as_str),
        Some("2023-05-01T00:00:00Z")
    );
    assert_eq!(
        pairs.get("stop_time").map(String::as_str),
        Some("2023-05-01T23:59:59Z")
    );
    assert_eq!(pairs.get("limit").map(String::as_str), Some("3"));
    assert_eq!(pairs.get("offset").map(String::as_str), Some("3"));
}

/// Pages produced by following next links never repeat an identifier.
#[tokio::test]
async fn test_pages_are_disjoint_by_identifier() {
    let service = seeded_service(7);
    let mut url = request_url("limit=3");
    let mut seen: Vec<String> = Vec::new();

    loop {
        let page = service.search(&raw_from_url(&url), &url).await.unwrap();
        for id in product_ids(&page) {
            assert!(!seen.contains(&id), "id {} repeated across pages", id);
            seen.push(id);
        }
        match page.next {
            Some(next) => url = Url::parse(&next).unwrap(),
            None => break,
        }
    }
    assert_eq!(seen.len(), 7);
}

/// Re-submitting a next URL reproduces the same page shape every time.
#[tokio::test]
async fn test_next_urls_are_idempotent() {
    let service = seeded_service(6);
    let url = request_url("limit=2");
    let page = service.search(&raw_from_url(&url), &url).await.unwrap();
    let next = Url::parse(&page.next.unwrap()).unwrap();

    let first = service.search(&raw_from_url(&next), &next).await.unwrap();
    let second = service.search(&raw_from_url(&next), &next).await.unwrap();
    assert_eq!(product_ids(&first), product_ids(&second));
    assert_eq!(first.next, second.next);
}
