mod common;

use common::StubStore;
use moviescope::controls::ControlState;
use moviescope::dataset::BoundDataset;
use moviescope::filter::filter_dataset;
use serde_json::{json, Value};

fn get_page(url: &str) -> (u16, String) {
    match ureq::get(url).call() {
        Ok(response) => {
            let status = response.status();
            (status, response.into_string().expect("page body"))
        }
        Err(ureq::Error::Status(status, response)) => {
            (status, response.into_string().unwrap_or_default())
        }
        Err(e) => panic!("page request failed: {}", e),
    }
}

fn embedded_data(html: &str) -> BoundDataset {
    let start_tag = "<script id=\"moviescope-data\" type=\"application/json\">";
    let start = html.find(start_tag).expect("payload script") + start_tag.len();
    let end = start + html[start..].find("</script>").expect("payload end");
    let payload: Value = serde_json::from_str(&html[start..end]).expect("payload json");
    serde_json::from_value(payload["data"].clone()).expect("bound dataset")
}

#[test]
fn test_page_embeds_full_dataset() {
    let store = StubStore::replying(common::sample_movies());
    let app = store.start_app();

    let (status, html) = get_page(&app);
    assert_eq!(status, 200);
    assert!(html.contains("<svg"));
    assert!(!html.contains("class=\"notice\""));

    // Initial render is unfiltered: every record, including ones the controls would hide.
    let data = embedded_data(&html);
    assert_eq!(data.len(), 6);
    assert!(data.is_consistent());
    assert_eq!(data.title[4].as_deref(), Some("Unreleased"));
    assert_eq!(data.released[4], None);
    assert_eq!(data.imdbvotes[0], Some(612_000.0));
    assert!(data.color.iter().all(|c| c == "#FF9900"));

    // Points missing either rating are not drawn; here every movie has both.
    assert_eq!(html.matches("<circle").count(), 6);

    let requests = store.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].operation, "get");
    assert_eq!(requests[0].collection, "movies");
    assert_eq!(requests[0].body, json!({"offset": 0, "limit": 2000}));
}

#[test]
fn test_every_load_fetches_again() {
    let store = StubStore::replying(json!([]));
    let app = store.start_app();

    get_page(&app);
    get_page(&app);
    assert_eq!(store.requests().len(), 2);
}

#[test]
fn test_store_error_still_renders_page() {
    let store = StubStore::replying(json!({"ErrorCode": 1, "message": "bad token"}));
    let app = store.start_app();

    let (status, html) = get_page(&app);
    assert_eq!(status, 200);
    assert!(html.contains("class=\"notice\""));
    assert!(html.contains("bad token"));
    assert!(embedded_data(&html).is_empty());
    assert!(html.contains("id=\"genre\""));
}

#[test]
fn test_unknown_route_is_not_found() {
    let store = StubStore::replying(json!([]));
    let app = store.start_app();

    let (status, _) = get_page(&format!("{}/api", app));
    assert_eq!(status, 404);
    assert!(store.requests().is_empty());
}

#[test]
fn test_unparsable_votes_excluded_on_both_sides() {
    let store = StubStore::replying(json!([
        {"title": "Odd", "imdbrating": 7.0, "numericrating": 70, "released": "01 Jan 2000",
         "imdbvotes": "NaN", "genre": "Drama"},
        {"title": "Even", "imdbrating": 7.5, "numericrating": 80, "released": "01 Jan 2000",
         "imdbvotes": 900, "genre": "Drama"}
    ]));
    let app = store.start_app();

    let (status, html) = get_page(&app);
    assert_eq!(status, 200);

    // The page script receives null and skips the row before any comparison.
    let data = embedded_data(&html);
    assert_eq!(data.imdbvotes, vec![None, Some(900.0)]);
    assert!(html.contains("full.imdbvotes[i] === null"));

    // The Rust engine drops the same row.
    let visible = filter_dataset(&data, &ControlState::default());
    assert_eq!(visible.title, vec![Some("Even".to_string())]);
}
