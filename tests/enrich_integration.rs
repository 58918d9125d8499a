//! Integration tests for DOI enrichment against mock Crossref and OpenAlex servers.

use std::time::Duration;

use cvjson_core::enrich::{
    CrossrefSource, DoiEnricher, DoiSource, EnrichOptions, LookupError, OpenAlexSource,
    RetryPolicy,
};
use cvjson_core::record::Entry;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TITLE: &str = "Test Publication Title";

fn no_delay_options() -> EnrichOptions {
    EnrichOptions {
        mailto: Some("test@example.com".to_string()),
        request_delay: Duration::ZERO,
        ..EnrichOptions::default()
    }
}

fn enricher(crossref: &MockServer, openalex: &MockServer) -> DoiEnricher {
    let options = no_delay_options();
    let sources: Vec<Box<dyn DoiSource>> = vec![
        Box::new(CrossrefSource::with_base_url(options.mailto.clone(), crossref.uri()).unwrap()),
        Box::new(OpenAlexSource::with_base_url(options.mailto.clone(), openalex.uri()).unwrap()),
    ];
    DoiEnricher::new(sources, &options).with_retry_policy(RetryPolicy::new(3, Duration::ZERO))
}

fn crossref_json(doi: &str, title: &str, year: i32) -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "message": {
            "items": [
                {
                    "DOI": doi,
                    "title": [title],
                    "issued": {"date-parts": [[year, 5]]}
                }
            ]
        }
    })
}

fn openalex_json(doi: &str, title: &str, year: i32) -> serde_json::Value {
    serde_json::json!({
        "results": [
            {
                "doi": format!("https://doi.org/{doi}"),
                "title": title,
                "publication_year": year
            }
        ]
    })
}

#[tokio::test]
async fn test_crossref_match_is_accepted() {
    let crossref = MockServer::start().await;
    let openalex = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("query.bibliographic", TITLE))
        .and(query_param("mailto", "test@example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(crossref_json("10.1234/test", TITLE, 2023)),
        )
        .expect(1)
        .mount(&crossref)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&openalex)
        .await;

    let found = enricher(&crossref, &openalex)
        .lookup(TITLE, Some(2023))
        .await
        .expect("crossref should match");
    assert_eq!(found.doi, "10.1234/test");
    assert_eq!(found.source, "crossref");
    assert!(found.confidence > 0.99);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let crossref = MockServer::start().await;
    let openalex = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&crossref)
        .await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(crossref_json("10.1234/retry", TITLE, 2023)),
        )
        .expect(1)
        .mount(&crossref)
        .await;

    let found = enricher(&crossref, &openalex)
        .lookup(TITLE, Some(2023))
        .await
        .expect("third attempt should succeed");
    assert_eq!(found.doi, "10.1234/retry");
}

#[tokio::test]
async fn test_permanent_failure_falls_through_to_openalex() {
    let crossref = MockServer::start().await;
    let openalex = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&crossref)
        .await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("search", TITLE))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openalex_json("10.5555/oa", TITLE, 2023)),
        )
        .expect(1)
        .mount(&openalex)
        .await;

    let found = enricher(&crossref, &openalex)
        .lookup(TITLE, Some(2023))
        .await
        .expect("openalex should match");
    assert_eq!(found.doi, "10.5555/oa");
    assert_eq!(found.source, "openalex");
}

#[tokio::test]
async fn test_dissimilar_or_wrong_year_candidates_are_rejected() {
    let crossref = MockServer::start().await;
    let openalex = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crossref_json(
            "10.1234/other",
            "An Entirely Different Paper About Something Else",
            2023,
        )))
        .mount(&crossref)
        .await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openalex_json("10.5555/old", TITLE, 2015)),
        )
        .mount(&openalex)
        .await;

    let found = enricher(&crossref, &openalex).lookup(TITLE, Some(2023)).await;
    assert!(found.is_none());
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let crossref = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&crossref)
        .await;

    let source = CrossrefSource::with_base_url(None, crossref.uri()).unwrap();
    let err = source.search(TITLE).await.unwrap_err();
    assert!(matches!(err, LookupError::Decode { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_enrich_entries_fills_missing_dois_only() {
    let crossref = MockServer::start().await;
    let openalex = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("query.bibliographic", TITLE))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(crossref_json("10.1234/test", TITLE, 2023)),
        )
        .expect(1)
        .mount(&crossref)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&openalex)
        .await;

    let mut missing = Entry::new(TITLE, "Peer-Reviewed Journal Articles");
    missing.year = Some(2023);
    let mut present = Entry::new("Already Linked", "Peer-Reviewed Journal Articles");
    present.doi = Some("10.9999/kept".to_string());
    let mut entries = vec![missing, present];

    let mut seen = 0;
    let summary = enricher(&crossref, &openalex)
        .enrich_entries(&mut entries, |_| seen += 1)
        .await;

    assert_eq!(seen, 2);
    assert_eq!(summary.looked_up, 1);
    assert_eq!(summary.found, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(entries[0].doi.as_deref(), Some("10.1234/test"));
    assert_eq!(entries[1].doi.as_deref(), Some("10.9999/kept"));
}
